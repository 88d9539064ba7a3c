// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::ops::RangeInclusive;

use rust_decimal::Decimal;

/// Voting-power split of one epoch: the share reserved for
/// foundation-operated slots and the share distributed over external stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingInstance {
    foundation_vote_percent: Decimal,
    external_vote_percent: Decimal,
    skip_power_check: bool,
}

impl VotingInstance {
    pub fn new(
        foundation_vote_percent: Decimal,
        external_vote_percent: Decimal,
    ) -> Self {
        Self {
            foundation_vote_percent,
            external_vote_percent,
            skip_power_check: false,
        }
    }

    /// Exempts the epoch from residue correction and the sum-to-one check.
    pub fn with_power_check_skipped(mut self) -> Self {
        self.skip_power_check = true;
        self
    }

    pub fn foundation_vote_percent(&self) -> Decimal {
        self.foundation_vote_percent
    }

    pub fn external_vote_percent(&self) -> Decimal {
        self.external_vote_percent
    }

    pub fn skips_power_check(&self) -> bool {
        self.skip_power_check
    }
}

/// Epoch-indexed source of voting-power instances. Threaded explicitly into
/// roster computation so synthetic schedules can drive tests.
pub trait Schedule {
    fn instance_for_epoch(&self, epoch: u64) -> VotingInstance;
}

/// Flat schedule used by local deployments and most tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalnetSchedule;

impl Schedule for LocalnetSchedule {
    fn instance_for_epoch(&self, _epoch: u64) -> VotingInstance {
        VotingInstance::new(Decimal::new(68, 2), Decimal::new(32, 2))
    }
}

/// Testnet schedule. Epochs 73305..=73490 form the incident-recovery window
/// during which foundation slots were handed 70% of the voting power and the
/// sum-to-one rule was suspended.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestnetSchedule;

impl TestnetSchedule {
    const INCIDENT_RECOVERY_EPOCHS: RangeInclusive<u64> = 73305..=73490;
}

impl Schedule for TestnetSchedule {
    fn instance_for_epoch(&self, epoch: u64) -> VotingInstance {
        if Self::INCIDENT_RECOVERY_EPOCHS.contains(&epoch) {
            VotingInstance::new(Decimal::new(70, 2), Decimal::new(40, 2))
                .with_power_check_skipped()
        } else {
            VotingInstance::new(Decimal::new(68, 2), Decimal::new(32, 2))
        }
    }
}

/// Schedule returning the same instance for every epoch, for synthetic
/// committees.
#[derive(Debug, Clone, Copy)]
pub struct FixedSchedule {
    instance: VotingInstance,
}

impl FixedSchedule {
    pub fn new(instance: VotingInstance) -> Self {
        Self { instance }
    }
}

impl Schedule for FixedSchedule {
    fn instance_for_epoch(&self, _epoch: u64) -> VotingInstance {
        self.instance
    }
}
