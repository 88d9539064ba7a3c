// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

#![deny(unused_crate_dependencies)]
#![deny(unused_extern_crates)]

pub mod account;
pub mod bls;
pub mod shard;

/// A 32-byte block header hash.
pub type Hash = [u8; 32];

/// Encode a byte array into a shortened HEX representation.
pub fn to_str(bytes: &[u8]) -> String {
    const OFFSET: usize = 16;
    let hex = hex::encode(bytes);
    if bytes.len() <= OFFSET {
        return hex;
    }

    let len = hex.len();

    let first = &hex[0..OFFSET];
    let last = &hex[len - OFFSET..];

    format!("{first}...{last}")
}

pub fn serialize_hex<const N: usize, S>(
    t: &[u8; N],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let hex = hex::encode(t);
    serializer.serialize_str(&hex)
}

/// Hex form with the `0x` prefix, as used for block header hashes.
pub fn serialize_hex_prefixed<const N: usize, S>(
    t: &[u8; N],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let hex = format!("0x{}", hex::encode(t));
    serializer.serialize_str(&hex)
}
