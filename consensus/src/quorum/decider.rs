// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;

use node_data::account::Address;
use node_data::bls::{
    self, PublicKey, SerializedPublicKey, Signature,
};
use node_data::shard::Committee;
use node_data::Hash;

use crate::aggregator::{Ballot, BallotBox};
use crate::config;
use crate::errors::{VoteError, VotePowerError};
use crate::numeric;
use crate::quorum::{Phase, Policy};
use crate::schedule::Schedule;
use crate::votepower::{self, Roster};

/// Gate of one shard's votes: owns the epoch roster and one ballot box per
/// phase, validates every incoming vote, and answers quorum queries under
/// the configured policy.
///
/// Mutators take `&mut self`; reads may run concurrently on a shared
/// reference. The owning consensus task serializes mutations, typically
/// behind a reader/writer lock.
pub struct Decider {
    policy: Policy,
    shard_id: u32,
    participants: Vec<PublicKey>,
    participant_index: HashMap<SerializedPublicKey, usize>,
    roster: Option<Arc<Roster>>,
    prepare_votes: BallotBox,
    commit_votes: BallotBox,
    view_change_votes: BallotBox,
}

impl Decider {
    pub fn new(policy: Policy, shard_id: u32) -> Self {
        Self {
            policy,
            shard_id,
            participants: vec![],
            participant_index: HashMap::new(),
            roster: None,
            prepare_votes: BallotBox::default(),
            commit_votes: BallotBox::default(),
            view_change_votes: BallotBox::default(),
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    /// Replaces the participant key set. Ballot boxes and roster are left
    /// untouched.
    pub fn update_participants(&mut self, keys: Vec<PublicKey>) {
        self.participant_index = keys
            .iter()
            .enumerate()
            .map(|(position, key)| (*key.bytes(), position))
            .collect();
        self.participants = keys;
    }

    pub fn participants(&self) -> &[PublicKey] {
        &self.participants
    }

    pub fn participants_count(&self) -> u64 {
        self.participants.len() as u64
    }

    /// Computes and attaches the epoch roster for `committee`.
    pub fn set_voters(
        &mut self,
        committee: &Committee,
        epoch: Option<u64>,
        schedule: &dyn Schedule,
    ) -> Result<Arc<Roster>, VotePowerError> {
        let roster = Arc::new(votepower::compute(committee, epoch, schedule)?);
        self.roster = Some(roster.clone());
        Ok(roster)
    }

    pub fn roster(&self) -> Option<Arc<Roster>> {
        self.roster.clone()
    }

    /// Annotates a roster voter with the raw stake behind its effective
    /// stake, for the JSON surface.
    pub fn set_raw_stake(
        &mut self,
        key: &SerializedPublicKey,
        raw_stake: Decimal,
    ) {
        if let Some(roster) = self.roster.as_mut() {
            if let Some(voter) = Arc::make_mut(roster).voters.get_mut(key) {
                voter.vote.raw_stake = raw_stake;
            }
        }
    }

    /// Validates and records a vote for `phase`.
    ///
    /// The checks run in order: committee membership, duplicate keys within
    /// the vote, per-key resubmission, the per-account rules of the stake
    /// policy, and finally verification of `signature` against the
    /// aggregate of the signers' keys over `header_hash`. A failed vote
    /// leaves the decider unchanged.
    pub fn add_new_vote(
        &mut self,
        phase: Phase,
        signers: &[&PublicKey],
        signature: &Signature,
        header_hash: Hash,
        height: u64,
        view_id: u64,
    ) -> Result<Arc<Ballot>, VoteError> {
        let mut keys = Vec::with_capacity(signers.len());
        for signer in signers {
            if !self.participant_index.contains_key(signer.bytes()) {
                return Err(VoteError::NotInCommittee(*signer.bytes()));
            }
            keys.push(*signer.bytes());
        }

        let ballot_box = self.ballot_box(phase);
        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if !seen.insert(*key) {
                return Err(VoteError::DuplicateKeyInVote(*key));
            }
            if ballot_box.ballot(key).is_some() {
                return Err(VoteError::AlreadySubmitted(*key));
            }
        }

        if self.policy == Policy::SuperMajorityStake {
            self.check_account_participation(phase, &keys)?;
        }

        let aggregate_key = bls::aggregate_public_keys(signers)?;
        signature.verify_hash(&aggregate_key, &header_hash)?;

        self.submit_vote(phase, &keys, signature, header_hash, height, view_id)
    }

    /// Commits a pre-validated vote into the phase's ballot box.
    fn submit_vote(
        &mut self,
        phase: Phase,
        keys: &[SerializedPublicKey],
        signature: &Signature,
        header_hash: Hash,
        height: u64,
        view_id: u64,
    ) -> Result<Arc<Ballot>, VoteError> {
        self.ballot_box_mut(phase)
            .record(keys, signature, header_hash, height, view_id)
    }

    /// Stake-policy account rules: all external keys of one aggregated vote
    /// must share an earning account, and an account participates at most
    /// once per phase across all of its keys.
    fn check_account_participation(
        &self,
        phase: Phase,
        keys: &[SerializedPublicKey],
    ) -> Result<(), VoteError> {
        let roster = self.roster.as_ref().ok_or(VoteError::RosterNotSet)?;

        let mut accounts: HashSet<Address> =
            HashSet::with_capacity(keys.len());
        let mut external_account: Option<Address> = None;
        for key in keys {
            let voter = roster
                .voters
                .get(key)
                .ok_or(VoteError::NotInCommittee(*key))?;

            if !voter.is_foundation_node {
                match external_account {
                    None => {
                        external_account = Some(voter.vote.earning_account)
                    }
                    Some(account)
                        if account != voter.vote.earning_account =>
                    {
                        return Err(VoteError::MultipleAccountsInVote);
                    }
                    Some(_) => {}
                }
            }
            accounts.insert(voter.vote.earning_account);
        }

        for submitted in self.ballot_box(phase).signers() {
            if let Some(voter) = roster.voters.get(submitted) {
                if accounts.contains(&voter.vote.earning_account) {
                    return Err(VoteError::AlreadySubmitted(*submitted));
                }
            }
        }

        Ok(())
    }

    pub fn read_ballot(
        &self,
        phase: Phase,
        key: &SerializedPublicKey,
    ) -> Option<&Arc<Ballot>> {
        self.ballot_box(phase).ballot(key)
    }

    pub fn signers_count(&self, phase: Phase) -> u64 {
        self.ballot_box(phase).signers_count()
    }

    pub fn aggregate_votes(&self, phase: Phase) -> Option<Signature> {
        self.ballot_box(phase).aggregate().cloned()
    }

    pub fn is_quorum_achieved(&self, phase: Phase) -> bool {
        match self.policy {
            Policy::SuperMajorityVote => {
                self.signers_count(phase) * config::SUPER_MAJORITY_DEN
                    >= self.participants_count() * config::SUPER_MAJORITY_NUM
                        + 1
            }
            Policy::SuperMajorityStake => match &self.roster {
                None => false,
                Some(roster) => {
                    let tally: Decimal = self
                        .ballot_box(phase)
                        .signers()
                        .filter_map(|key| roster.voters.get(key))
                        .map(|voter| voter.overall_percent)
                        .sum();
                    tally > numeric::super_majority()
                }
            },
        }
    }

    /// Clears the Prepare and Commit boxes. ViewChange ballots survive the
    /// reset.
    pub fn reset_prepare_and_commit_votes(&mut self) {
        self.prepare_votes.clear();
        self.commit_votes.clear();
    }

    fn ballot_box(&self, phase: Phase) -> &BallotBox {
        match phase {
            Phase::Prepare => &self.prepare_votes,
            Phase::Commit => &self.commit_votes,
            Phase::ViewChange => &self.view_change_votes,
        }
    }

    fn ballot_box_mut(&mut self, phase: Phase) -> &mut BallotBox {
        match phase {
            Phase::Prepare => &mut self.prepare_votes,
            Phase::Commit => &mut self.commit_votes,
            Phase::ViewChange => &mut self.view_change_votes,
        }
    }
}
