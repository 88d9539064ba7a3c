// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Phase-level quorum tracking.

use std::fmt;

mod decider;
pub use decider::Decider;

/// The FBFT phases a vote can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Prepare,
    Commit,
    ViewChange,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The lower-camel viewChange literal is fixed on the wire.
        let name = match self {
            Phase::Prepare => "Prepare",
            Phase::Commit => "Commit",
            Phase::ViewChange => "viewChange",
        };
        f.write_str(name)
    }
}

/// How a phase decides that enough voting power stands behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Strictly more than two thirds of the participant keys.
    SuperMajorityVote,
    /// Strictly more than two thirds of the roster's stake share.
    SuperMajorityStake,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Policy::SuperMajorityVote => "SuperMajorityVote",
            Policy::SuperMajorityStake => "SuperMajorityStake",
        };
        f.write_str(name)
    }
}
