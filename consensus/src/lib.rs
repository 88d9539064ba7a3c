// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

#![deny(unused_crate_dependencies)]
#![deny(unused_extern_crates)]

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod numeric;
pub mod quorum;
pub mod reward;
pub mod schedule;
pub mod votepower;

#[cfg(test)]
mod tests {
    // Adding bench and integration-test dependencies here to satisfy
    // `unused_crate_dependencies` lint
    use criterion as _;
    use hex_literal as _;
    use tokio as _;
}
