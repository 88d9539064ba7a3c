// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Per-phase ballot boxes collecting votes and their aggregate signature.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use node_data::bls::{
    SerializedPublicKey, SerializedSignature, Signature,
};
use node_data::{serialize_hex_prefixed, Hash};

use crate::errors::VoteError;

/// A vote cast by a validator, possibly under several of its keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ballot {
    #[serde(rename = "bls-public-keys")]
    pub signer_pub_keys: Vec<SerializedPublicKey>,
    #[serde(
        rename = "block-header-hash",
        serialize_with = "serialize_hex_prefixed"
    )]
    pub block_header_hash: Hash,
    #[serde(rename = "bls-signature")]
    pub signature: SerializedSignature,
    #[serde(rename = "block-height")]
    pub height: u64,
    #[serde(rename = "view-id")]
    pub view_id: u64,
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Running aggregate of all recorded vote signatures.
#[derive(Default)]
pub struct AggrSignature {
    data: Option<Signature>,
}

impl AggrSignature {
    pub fn add(&mut self, signature: &Signature) {
        self.data = Some(match &self.data {
            Some(aggregate) => aggregate.aggregate(signature),
            None => signature.clone(),
        });
    }

    pub fn aggregated(&self) -> Option<&Signature> {
        self.data.as_ref()
    }

    pub fn aggregated_bytes(&self) -> Option<SerializedSignature> {
        self.data.as_ref().map(Signature::to_bytes)
    }
}

/// One phase's box of accepted ballots, keyed by individual signer key. A
/// multi-key vote files one shared ballot under each of its keys.
#[derive(Default)]
pub struct BallotBox {
    aggregate_signature: AggrSignature,
    ballots: HashMap<SerializedPublicKey, Arc<Ballot>>,
}

impl BallotBox {
    /// Records a vote under all of `signer_keys`, all-or-nothing: the box is
    /// untouched unless every key passes validation.
    pub fn record(
        &mut self,
        signer_keys: &[SerializedPublicKey],
        signature: &Signature,
        block_header_hash: Hash,
        height: u64,
        view_id: u64,
    ) -> Result<Arc<Ballot>, VoteError> {
        let mut seen = HashSet::with_capacity(signer_keys.len());
        for key in signer_keys {
            if !seen.insert(*key) {
                return Err(VoteError::DuplicateKeyInVote(*key));
            }
            if self.ballots.contains_key(key) {
                return Err(VoteError::AlreadySubmitted(*key));
            }
        }

        self.aggregate_signature.add(signature);

        let ballot = Arc::new(Ballot {
            signer_pub_keys: signer_keys.to_vec(),
            block_header_hash,
            signature: signature.to_bytes(),
            height,
            view_id,
        });
        for key in signer_keys {
            self.ballots.insert(*key, ballot.clone());
        }

        trace!(
            signers = signer_keys.len(),
            total = self.ballots.len(),
            "ballot recorded"
        );

        Ok(ballot)
    }

    pub fn ballot(
        &self,
        key: &SerializedPublicKey,
    ) -> Option<&Arc<Ballot>> {
        self.ballots.get(key)
    }

    pub fn signers(&self) -> impl Iterator<Item = &SerializedPublicKey> {
        self.ballots.keys()
    }

    pub fn signers_count(&self) -> u64 {
        self.ballots.len() as u64
    }

    pub fn aggregate(&self) -> Option<&Signature> {
        self.aggregate_signature.aggregated()
    }

    pub fn clear(&mut self) {
        self.aggregate_signature = AggrSignature::default();
        self.ballots.clear();
    }
}
