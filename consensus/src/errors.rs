// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use node_data::bls::{BlsError, SerializedPublicKey};
use thiserror::Error;

/// Errors surfaced while computing a voting-power roster. Both indicate a
/// misconfigured schedule or an impossible committee and should keep the
/// round from starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VotePowerError {
    #[error("no epoch supplied for roster compute")]
    NilEpoch,
    #[error("voting power not equal to one")]
    VotingPowerNotEqualOne,
}

/// Errors rejecting a single vote. None of them leaves a trace in the
/// decider; the caller may submit another vote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("signer key {0} is not in the committee")]
    NotInCommittee(SerializedPublicKey),
    #[error("duplicate key found in votes {0}")]
    DuplicateKeyInVote(SerializedPublicKey),
    #[error("vote is already submitted {0}")]
    AlreadySubmitted(SerializedPublicKey),
    #[error("aggregated vote signed by multiple earning accounts")]
    MultipleAccountsInVote,
    #[error("invalid aggregate signature: {0}")]
    InvalidSignature(#[from] BlsError),
    #[error("no roster set for stake-weighted voting")]
    RosterNotSet,
}
