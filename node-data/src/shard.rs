// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use rust_decimal::Decimal;

use crate::account::Address;
use crate::bls::SerializedPublicKey;

/// Shard id of the beacon chain.
pub const BEACON_CHAIN_SHARD_ID: u32 = 0;

/// One committee seat.
///
/// Foundation-operated seats carry no effective stake; external validator
/// seats carry the stake backing the seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub earning_address: Address,
    pub bls_public_key: SerializedPublicKey,
    pub effective_stake: Option<Decimal>,
}

pub type SlotList = Vec<Slot>;

/// The ordered seat list of one shard for one epoch. Seat order is
/// significant: it drives the residue tie-break of the roster builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committee {
    pub shard_id: u32,
    pub slots: SlotList,
}

impl Committee {
    pub fn new(shard_id: u32, slots: SlotList) -> Self {
        Self { shard_id, slots }
    }
}
