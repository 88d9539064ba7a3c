// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Fixed-point helpers for stake arithmetic.
//!
//! All voting-power decimals carry at most [`PRECISION`] fractional digits
//! and are combined with truncating operations, so a tally differs from its
//! exact value only in digits the roster builder's residue correction
//! reconciles.

use rust_decimal::Decimal;

use crate::config;

/// Number of fractional digits carried by voting-power decimals.
pub const PRECISION: u32 = 18;

/// `a / b`, truncated to [`PRECISION`] fractional digits.
pub fn quo_truncate(a: Decimal, b: Decimal) -> Decimal {
    (a / b).trunc_with_scale(PRECISION)
}

/// `a * b`, truncated to [`PRECISION`] fractional digits.
pub fn mul_truncate(a: Decimal, b: Decimal) -> Decimal {
    (a * b).trunc_with_scale(PRECISION)
}

/// The stake share a phase tally must strictly exceed to reach quorum.
pub fn super_majority() -> Decimal {
    Decimal::from(config::SUPER_MAJORITY_NUM)
        / Decimal::from(config::SUPER_MAJORITY_DEN)
}

/// Serializers rendering decimals with exactly [`PRECISION`] fractional
/// digits, the form the roster JSON surface uses.
pub mod dec18 {
    use rust_decimal::Decimal;
    use serde::Serializer;

    pub fn serialize<S>(
        value: &Decimal,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{value:.18}"))
    }
}
