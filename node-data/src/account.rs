// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use bech32::{ToBase32, Variant};

/// Human readable part of bech32-rendered account strings.
pub const ADDRESS_HRP: &str = "mer";

/// A 20-byte earning account address.
pub type Address = ethereum_types::H160;

/// Renders an address in its bech32 string form.
pub fn to_bech32(addr: &Address) -> String {
    bech32::encode(ADDRESS_HRP, addr.as_bytes().to_base32(), Variant::Bech32)
        .expect("static hrp")
}

pub fn serialize_bech32<S>(
    addr: &Address,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&to_bech32(addr))
}
