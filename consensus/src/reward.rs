// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Read interface of the block-reward collaborator.

use ethereum_types::U256;

use node_data::account::Address;
use node_data::bls::SerializedPublicKey;
use node_data::shard::SlotList;

/// One validator's cut of a round's block reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pub shard_id: u32,
    pub addr: Address,
    pub newly_earned: U256,
    pub earning_key: SerializedPublicKey,
}

/// Everything paid out for one completed consensus round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedRound {
    pub total: U256,
    pub beacon_chain_award: Vec<Payout>,
    pub shard_chain_award: Vec<Payout>,
}

/// Read-only view of reward results, implemented by the block-reward
/// collaborator.
pub trait Reader {
    fn read_round_result(&self) -> CompletedRound;
    fn missing_signers(&self) -> SlotList;
}
