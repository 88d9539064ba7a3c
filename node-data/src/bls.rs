// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::cmp::Ordering;
use std::fmt::{self, Debug};

use blst::min_pk as bls_impl;
use blst::BLST_ERROR;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

use crate::{to_str, Hash};

/// Size of a compressed BLS public key (G1 point).
pub const PUBLIC_KEY_SIZE: usize = 48;
/// Size of a compressed BLS signature (G2 point).
pub const SIGNATURE_SIZE: usize = 96;

/// Domain separation tag of the min-pk proof-of-possession ciphersuite.
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlsError {
    #[error("malformed BLS public key")]
    InvalidPublicKey,
    #[error("malformed BLS signature")]
    InvalidSignature,
    #[error("aggregate signature verification failed")]
    VerificationFailed,
    #[error("cannot aggregate an empty key set")]
    EmptyAggregate,
}

/// A wrapper of a 48-sized array holding a compressed public key.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct SerializedPublicKey(pub [u8; PUBLIC_KEY_SIZE]);

impl Default for SerializedPublicKey {
    fn default() -> Self {
        SerializedPublicKey([0; PUBLIC_KEY_SIZE])
    }
}

impl SerializedPublicKey {
    pub fn inner(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Full hex representation of the inner data.
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for SerializedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Debug for SerializedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_str(&self.0))
    }
}

impl serde::Serialize for SerializedPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        crate::serialize_hex(&self.0, serializer)
    }
}

/// A wrapper of a 96-sized array holding a compressed signature.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct SerializedSignature(pub [u8; SIGNATURE_SIZE]);

impl Default for SerializedSignature {
    fn default() -> Self {
        SerializedSignature([0; SIGNATURE_SIZE])
    }
}

impl SerializedSignature {
    pub fn inner(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Debug for SerializedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_str(&self.0))
    }
}

impl serde::Serialize for SerializedSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        crate::serialize_hex(&self.0, serializer)
    }
}

/// Extends blst's public key by caching the serialized form on construction.
///
/// See also PublicKey::bytes(&self)
#[derive(Clone)]
pub struct PublicKey {
    inner: bls_impl::PublicKey,
    as_bytes: SerializedPublicKey,
}

impl PublicKey {
    pub fn new(inner: bls_impl::PublicKey) -> Self {
        let as_bytes = SerializedPublicKey(inner.compress());
        Self { inner, as_bytes }
    }

    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_SIZE]) -> Result<Self, BlsError> {
        let inner = bls_impl::PublicKey::key_validate(bytes)
            .map_err(|_| BlsError::InvalidPublicKey)?;
        Ok(Self {
            inner,
            as_bytes: SerializedPublicKey(*bytes),
        })
    }

    /// `bytes` returns a reference to the compressed form initialized on
    /// PublicKey::new call. NB Frequent use of `compress()` creates a
    /// noticeable perf overhead.
    pub fn bytes(&self) -> &SerializedPublicKey {
        &self.as_bytes
    }

    pub fn inner(&self) -> &bls_impl::PublicKey {
        &self.inner
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes == other.as_bytes
    }
}

impl Eq for PublicKey {}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes.cmp(&other.as_bytes)
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("key", &self.as_bytes)
            .finish()
    }
}

/// A BLS secret key.
pub struct SecretKey(bls_impl::SecretKey);

impl SecretKey {
    /// Generates a fresh secret key from 32 bytes of rng-provided key
    /// material.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut ikm = [0u8; 32];
        rng.fill_bytes(&mut ikm);
        let sk = bls_impl::SecretKey::key_gen(&ikm, &[])
            .expect("32 bytes of key material");
        Self(sk)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self.0.sk_to_pk())
    }

    /// Signs a 32-byte hash.
    pub fn sign_hash(&self, hash: &Hash) -> Signature {
        Signature(self.0.sign(hash, DST, &[]))
    }
}

/// A BLS signature, possibly the aggregate of several signers.
#[derive(Clone)]
pub struct Signature(bls_impl::Signature);

impl Signature {
    pub fn from_bytes(bytes: &[u8; SIGNATURE_SIZE]) -> Result<Self, BlsError> {
        bls_impl::Signature::from_bytes(bytes)
            .map(Self)
            .map_err(|_| BlsError::InvalidSignature)
    }

    pub fn to_bytes(&self) -> SerializedSignature {
        SerializedSignature(self.0.compress())
    }

    /// Aggregate-adds `other`, yielding the combined signature.
    pub fn aggregate(&self, other: &Signature) -> Signature {
        let mut agg = bls_impl::AggregateSignature::from_signature(&self.0);
        agg.add_signature(&other.0, false)
            .expect("group check is disabled");
        Signature(agg.to_signature())
    }

    /// Verifies this (aggregate) signature over a 32-byte hash against an
    /// (aggregate) public key.
    pub fn verify_hash(
        &self,
        pubkey: &PublicKey,
        hash: &Hash,
    ) -> Result<(), BlsError> {
        match self.0.verify(true, hash, DST, &[], pubkey.inner(), true) {
            BLST_ERROR::BLST_SUCCESS => Ok(()),
            _ => Err(BlsError::VerificationFailed),
        }
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Signature {}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("signature", &self.to_bytes())
            .finish()
    }
}

/// Aggregates the given public keys into a single key (point addition).
pub fn aggregate_public_keys(
    keys: &[&PublicKey],
) -> Result<PublicKey, BlsError> {
    if keys.is_empty() {
        return Err(BlsError::EmptyAggregate);
    }

    let points: Vec<&bls_impl::PublicKey> =
        keys.iter().map(|key| key.inner()).collect();
    let agg = bls_impl::AggregatePublicKey::aggregate(&points, false)
        .map_err(|_| BlsError::InvalidPublicKey)?;

    Ok(PublicKey::new(agg.to_public_key()))
}
