// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Voting-power rosters.
//!
//! A roster maps every BLS key of a shard committee to its voting-power
//! share for one epoch. Foundation-operated slots split the foundation
//! percent of the schedule evenly; external slots split the external percent
//! in proportion to their effective stake. After both groups are assigned,
//! the truncation residue is folded into the last external slot so the
//! shares sum to one exactly.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use node_data::account::{self, Address};
use node_data::bls::SerializedPublicKey;
use node_data::shard::Committee;

use crate::errors::VotePowerError;
use crate::numeric::{self, dec18};
use crate::schedule::Schedule;

/// The stake-derived fields of one voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PureStakedVote {
    #[serde(
        rename = "earning-account",
        serialize_with = "account::serialize_bech32"
    )]
    pub earning_account: Address,
    #[serde(rename = "bls-public-key")]
    pub identity: SerializedPublicKey,
    #[serde(rename = "group-percent", serialize_with = "dec18::serialize")]
    pub group_percent: Decimal,
    #[serde(rename = "effective-stake", serialize_with = "dec18::serialize")]
    pub effective_stake: Decimal,
    #[serde(rename = "raw-stake", serialize_with = "dec18::serialize")]
    pub raw_stake: Decimal,
}

/// One voter of a shard roster, with its share of the overall voting power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakedVoter {
    #[serde(flatten)]
    pub vote: PureStakedVote,
    #[serde(skip)]
    pub is_foundation_node: bool,
    #[serde(rename = "overall-percent", serialize_with = "dec18::serialize")]
    pub overall_percent: Decimal,
}

impl fmt::Display for StakedVoter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// The per-shard table of voters and their voting-power shares.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Roster {
    pub voters: HashMap<SerializedPublicKey, StakedVoter>,
    #[serde(
        rename = "foundation-total-percent",
        serialize_with = "dec18::serialize"
    )]
    pub foundation_total_percent: Decimal,
    #[serde(
        rename = "external-total-percent",
        serialize_with = "dec18::serialize"
    )]
    pub external_total_percent: Decimal,
    #[serde(
        rename = "total-effective-stake",
        serialize_with = "dec18::serialize"
    )]
    pub total_effective_stake: Decimal,
    #[serde(rename = "foundation-slot-count")]
    pub foundation_slot_count: u64,
    #[serde(rename = "shard-id")]
    pub shard_id: u32,
}

impl Roster {
    pub fn new(shard_id: u32) -> Self {
        Self {
            voters: HashMap::new(),
            foundation_total_percent: Decimal::ZERO,
            external_total_percent: Decimal::ZERO,
            total_effective_stake: Decimal::ZERO,
            foundation_slot_count: 0,
            shard_id,
        }
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// An external voter card annotated with the shard it votes on.
#[derive(Debug, Clone, Serialize)]
pub struct VoteOnSubcommittee {
    #[serde(flatten)]
    pub vote: StakedVoter,
    #[serde(rename = "shard-id")]
    pub shard_id: u32,
}

/// Groups the external voter cards of several shard rosters by earning
/// account, in ascending shard order.
pub fn aggregate_rosters(
    rosters: &[Roster],
) -> HashMap<Address, Vec<VoteOnSubcommittee>> {
    let mut by_shard: Vec<&Roster> = rosters.iter().collect();
    by_shard.sort_by_key(|roster| roster.shard_id);

    let mut result: HashMap<Address, Vec<VoteOnSubcommittee>> = HashMap::new();
    for roster in by_shard {
        for voter in roster.voters.values() {
            if !voter.is_foundation_node {
                result
                    .entry(voter.vote.earning_account)
                    .or_default()
                    .push(VoteOnSubcommittee {
                        vote: voter.clone(),
                        shard_id: roster.shard_id,
                    });
            }
        }
    }

    result
}

/// Computes the roster of `committee` for `epoch` under `schedule`.
///
/// Duplicate BLS keys keep their first slot's voter card; later occurrences
/// are dropped from the table (their share still counts toward the group
/// totals, matching the slot list the committee was built from).
pub fn compute(
    committee: &Committee,
    epoch: Option<u64>,
    schedule: &dyn Schedule,
) -> Result<Roster, VotePowerError> {
    let epoch = epoch.ok_or(VotePowerError::NilEpoch)?;
    let mut roster = Roster::new(committee.shard_id);

    for slot in &committee.slots {
        match slot.effective_stake {
            Some(stake) => roster.total_effective_stake += stake,
            None => roster.foundation_slot_count += 1,
        }
    }

    let instance = schedule.instance_for_epoch(epoch);
    let foundation_percent = instance.foundation_vote_percent();
    let external_percent = instance.external_vote_percent();
    let as_dec_slot_count = Decimal::from(roster.foundation_slot_count);

    let mut foundation_tally = Decimal::ZERO;
    let mut external_tally = Decimal::ZERO;
    let mut last_staked_key: Option<SerializedPublicKey> = None;

    for slot in &committee.slots {
        let mut voter = StakedVoter {
            vote: PureStakedVote {
                earning_account: slot.earning_address,
                identity: slot.bls_public_key,
                group_percent: Decimal::ZERO,
                effective_stake: Decimal::ZERO,
                raw_stake: Decimal::ZERO,
            },
            is_foundation_node: false,
            overall_percent: Decimal::ZERO,
        };

        if let Some(stake) = slot.effective_stake {
            voter.vote.effective_stake = stake;
            voter.vote.group_percent = if roster.total_effective_stake.is_zero()
            {
                Decimal::ZERO
            } else {
                numeric::quo_truncate(stake, roster.total_effective_stake)
            };
            voter.overall_percent =
                numeric::mul_truncate(voter.vote.group_percent, external_percent);
            external_tally += voter.overall_percent;
            last_staked_key = Some(slot.bls_public_key);
        } else {
            voter.is_foundation_node = true;
            voter.overall_percent =
                numeric::quo_truncate(foundation_percent, as_dec_slot_count);
            voter.vote.group_percent =
                numeric::quo_truncate(voter.overall_percent, foundation_percent);
            foundation_tally += voter.overall_percent;
        }

        match roster.voters.entry(slot.bls_public_key) {
            Entry::Vacant(entry) => {
                entry.insert(voter);
            }
            Entry::Occupied(_) => {
                debug!(
                    bls_key = %slot.bls_public_key,
                    "duplicate BLS key found"
                );
            }
        }
    }

    if !instance.skips_power_check() {
        match last_staked_key {
            Some(key) => {
                // Fold the truncation residue, of either sign, into the
                // slot that staked last.
                let diff = Decimal::ONE - (foundation_tally + external_tally);
                if !diff.is_zero() {
                    let voter = roster
                        .voters
                        .get_mut(&key)
                        .expect("staked slots are always inserted");
                    voter.overall_percent += diff;
                    external_tally += diff;
                }

                if foundation_tally + external_tally != Decimal::ONE {
                    return Err(VotePowerError::VotingPowerNotEqualOne);
                }
            }
            // Without external slots there is no residue sink; the schedule
            // must hand the foundation the full voting power.
            None => {
                if foundation_percent != Decimal::ONE {
                    return Err(VotePowerError::VotingPowerNotEqualOne);
                }
            }
        }
    }

    roster.foundation_total_percent = foundation_tally;
    roster.external_total_percent = external_tally;
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, RngCore, SeedableRng};

    use node_data::bls::SecretKey;
    use node_data::shard::{Slot, BEACON_CHAIN_SHARD_ID};

    use super::*;
    use crate::schedule::{
        FixedSchedule, LocalnetSchedule, TestnetSchedule, VotingInstance,
    };

    fn random_slot(rng: &mut StdRng) -> Slot {
        let secret_key = SecretKey::random(rng);
        let mut addr = [0u8; 20];
        rng.fill_bytes(&mut addr);

        Slot {
            earning_address: Address::from(addr),
            bls_public_key: *secret_key.public_key().bytes(),
            effective_stake: Some(Decimal::from(rng.gen_range(1..200u64))),
        }
    }

    fn mixed_committee(
        foundation: usize,
        staked: usize,
        seed: u64,
    ) -> Committee {
        let rng = &mut StdRng::seed_from_u64(seed);
        let mut slots = vec![];
        for _ in 0..foundation {
            let mut slot = random_slot(rng);
            slot.effective_stake = None;
            slots.push(slot);
        }
        for _ in 0..staked {
            slots.push(random_slot(rng));
        }
        Committee::new(BEACON_CHAIN_SHARD_ID, slots)
    }

    #[test]
    fn test_compute_matches_hand_rolled_roster() {
        let committee = mixed_committee(10, 10, 1337);
        let roster = compute(&committee, Some(3), &LocalnetSchedule)
            .expect("power sums to one");

        let instance = LocalnetSchedule.instance_for_epoch(3);
        let total_stake: Decimal = committee
            .slots
            .iter()
            .filter_map(|slot| slot.effective_stake)
            .sum();

        assert_eq!(roster.total_effective_stake, total_stake);
        assert_eq!(roster.foundation_slot_count, 10);
        assert_eq!(roster.voters.len(), 20);

        for slot in &committee.slots {
            let voter = &roster.voters[&slot.bls_public_key];
            match slot.effective_stake {
                Some(stake) => {
                    assert!(!voter.is_foundation_node);
                    assert_eq!(voter.vote.effective_stake, stake);
                    assert_eq!(
                        voter.vote.group_percent,
                        numeric::quo_truncate(stake, total_stake)
                    );
                }
                None => {
                    assert!(voter.is_foundation_node);
                    assert_eq!(
                        voter.overall_percent,
                        numeric::quo_truncate(
                            instance.foundation_vote_percent(),
                            Decimal::from(10)
                        )
                    );
                }
            }
            assert!(voter.overall_percent >= Decimal::ZERO);
            assert!(voter.overall_percent <= Decimal::ONE);
            assert!(voter.vote.group_percent >= Decimal::ZERO);
            assert!(voter.vote.group_percent <= Decimal::ONE);
        }

        assert_eq!(
            roster.foundation_total_percent + roster.external_total_percent,
            Decimal::ONE
        );
    }

    #[test]
    fn test_compute_without_epoch_fails() {
        let committee = mixed_committee(2, 2, 5);
        assert_eq!(
            compute(&committee, None, &LocalnetSchedule),
            Err(VotePowerError::NilEpoch)
        );
    }

    #[test]
    fn test_positive_residue_lands_on_last_staked_slot() {
        // Three equal stakes truncate at 1/3 each, leaving a positive
        // residue of a few atto-shares.
        let rng = &mut StdRng::seed_from_u64(99);
        let mut slots = vec![];
        let mut foundation = random_slot(rng);
        foundation.effective_stake = None;
        slots.push(foundation);
        for _ in 0..3 {
            let mut slot = random_slot(rng);
            slot.effective_stake = Some(Decimal::ONE);
            slots.push(slot);
        }
        let last_key = slots.last().unwrap().bls_public_key;

        let committee = Committee::new(BEACON_CHAIN_SHARD_ID, slots);
        let roster = compute(&committee, Some(3), &LocalnetSchedule)
            .expect("power sums to one");

        assert_eq!(
            roster.foundation_total_percent + roster.external_total_percent,
            Decimal::ONE
        );

        let last = &roster.voters[&last_key];
        for (key, voter) in &roster.voters {
            if !voter.is_foundation_node && *key != last_key {
                assert!(last.overall_percent > voter.overall_percent);
            }
        }
    }

    #[test]
    fn test_negative_residue_is_subtracted() {
        // Percents summing above one force a negative residue.
        let schedule = FixedSchedule::new(VotingInstance::new(
            Decimal::new(68, 2),
            Decimal::new(42, 2),
        ));
        let committee = mixed_committee(3, 7, 7);

        let roster =
            compute(&committee, Some(3), &schedule).expect("residue absorbed");
        assert_eq!(
            roster.foundation_total_percent + roster.external_total_percent,
            Decimal::ONE
        );
        assert!(roster.external_total_percent < Decimal::new(42, 2));
    }

    #[test]
    fn test_zero_external_slots_requires_full_foundation_percent() {
        let committee = mixed_committee(4, 0, 11);

        // A split reserving power for absent external slots cannot reach
        // one.
        assert_eq!(
            compute(&committee, Some(3), &LocalnetSchedule),
            Err(VotePowerError::VotingPowerNotEqualOne)
        );

        let all_foundation = FixedSchedule::new(VotingInstance::new(
            Decimal::ONE,
            Decimal::ZERO,
        ));
        let roster = compute(&committee, Some(3), &all_foundation)
            .expect("foundation holds all power");
        assert_eq!(roster.foundation_total_percent, Decimal::ONE);
        assert_eq!(roster.external_total_percent, Decimal::ZERO);

        // With a slot count that does not divide one, the tally keeps the
        // truncated per-slot shares; there is no external slot to absorb
        // the residue.
        let committee = mixed_committee(3, 0, 11);
        let roster = compute(&committee, Some(3), &all_foundation)
            .expect("full foundation percent");
        assert_eq!(
            roster.foundation_total_percent,
            Decimal::new(999_999_999_999_999_999, 18)
        );
    }

    #[test]
    fn test_zero_foundation_slots_is_all_external() {
        let all_external = FixedSchedule::new(VotingInstance::new(
            Decimal::ZERO,
            Decimal::ONE,
        ));
        let committee = mixed_committee(0, 5, 23);

        let roster = compute(&committee, Some(3), &all_external)
            .expect("stakers hold all power");
        assert_eq!(roster.foundation_slot_count, 0);
        assert_eq!(roster.foundation_total_percent, Decimal::ZERO);
        assert_eq!(roster.external_total_percent, Decimal::ONE);
    }

    #[test]
    fn test_duplicate_bls_key_keeps_first_card() {
        let rng = &mut StdRng::seed_from_u64(42);
        let mut first = random_slot(rng);
        first.effective_stake = None;
        let mut twin = random_slot(rng);
        twin.effective_stake = None;
        twin.bls_public_key = first.bls_public_key;
        let staked = random_slot(rng);

        let committee =
            Committee::new(BEACON_CHAIN_SHARD_ID, vec![first, twin, staked]);
        let roster = compute(&committee, Some(3), &LocalnetSchedule)
            .expect("power sums to one");

        // Both copies count as foundation slots, only one card survives.
        assert_eq!(roster.foundation_slot_count, 2);
        assert_eq!(roster.voters.len(), 2);
        assert_eq!(
            roster.foundation_total_percent + roster.external_total_percent,
            Decimal::ONE
        );
    }

    #[test]
    fn test_recovery_window_skips_power_check() {
        let committee = mixed_committee(3, 4, 77);

        let roster = compute(&committee, Some(73310), &TestnetSchedule)
            .expect("sum check suspended");
        assert_ne!(
            roster.foundation_total_percent + roster.external_total_percent,
            Decimal::ONE
        );

        // Outside the window the same committee reconciles normally.
        let roster = compute(&committee, Some(73500), &TestnetSchedule)
            .expect("power sums to one");
        assert_eq!(
            roster.foundation_total_percent + roster.external_total_percent,
            Decimal::ONE
        );
    }

    #[test]
    fn test_aggregate_rosters_groups_by_account() {
        let beacon = mixed_committee(1, 2, 3);
        let mut shard_one = mixed_committee(1, 2, 4);
        shard_one.shard_id = 1;

        // The same account stakes on both shards.
        let shared = beacon.slots[1].earning_address;
        shard_one.slots[1].earning_address = shared;

        let rosters = vec![
            compute(&shard_one, Some(3), &LocalnetSchedule).unwrap(),
            compute(&beacon, Some(3), &LocalnetSchedule).unwrap(),
        ];

        let grouped = aggregate_rosters(&rosters);
        let cards = &grouped[&shared];
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].shard_id, 0);
        assert_eq!(cards[1].shard_id, 1);

        for cards in grouped.values() {
            assert!(cards.iter().all(|card| !card.vote.is_foundation_node));
        }
    }
}
