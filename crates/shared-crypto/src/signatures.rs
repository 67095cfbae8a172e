//! # Payload Signatures
//!
//! Every payload crossing a node boundary is signed by its producer and
//! verified by its consumer before use.
//!
//! The signed message is the recursive hash of `[payload, context]`, where
//! `context` binds the signature to the payload type and ballot (for
//! example `["hlVCC", ee, vcs, vc, node]`).

use crate::hashing::{recursive_hash, Hashable};
use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::collections::HashMap;
use tracing::warn;

/// Signature attached to a payload (Ed25519, 64 bytes).
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSignature(#[serde_as(as = "Bytes")] [u8; 64]);

impl PayloadSignature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Signing and verification of payloads by keystore alias.
pub trait SignatureService: Send + Sync {
    /// Sign `payload` under `context` with this service's own key.
    fn sign(&self, payload: &Hashable, context: &Hashable) -> PayloadSignature;

    /// Verify `signature` against the key registered under `alias`.
    fn verify(
        &self,
        alias: &str,
        payload: &Hashable,
        context: &Hashable,
        signature: &PayloadSignature,
    ) -> bool;
}

fn signed_message(payload: &Hashable, context: &Hashable) -> [u8; 32] {
    recursive_hash(&Hashable::List(vec![payload.clone(), context.clone()]))
}

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Create from bytes, checking the point decodes.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &PayloadSignature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Ed25519 keypair.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message (deterministic).
    pub fn sign(&self, message: &[u8]) -> PayloadSignature {
        PayloadSignature(self.signing_key.sign(message).to_bytes())
    }
}

/// Keystore-backed signature service.
///
/// Holds this node's signing key under `own_alias` and the verifying keys
/// of every peer it accepts payloads from.
pub struct Ed25519SignatureService {
    own_alias: String,
    keypair: Ed25519KeyPair,
    trusted: HashMap<String, Ed25519PublicKey>,
}

impl Ed25519SignatureService {
    pub fn new(own_alias: impl Into<String>, keypair: Ed25519KeyPair) -> Self {
        let own_alias = own_alias.into();
        let mut trusted = HashMap::new();
        trusted.insert(own_alias.clone(), keypair.public_key());
        Self {
            own_alias,
            keypair,
            trusted,
        }
    }

    /// Register a peer's verifying key.
    pub fn trust(&mut self, alias: impl Into<String>, key: Ed25519PublicKey) {
        self.trusted.insert(alias.into(), key);
    }

    pub fn own_alias(&self) -> &str {
        &self.own_alias
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Look up a trusted key.
    pub fn trusted_key(&self, alias: &str) -> Result<&Ed25519PublicKey, CryptoError> {
        self.trusted
            .get(alias)
            .ok_or_else(|| CryptoError::UnknownAlias(alias.to_string()))
    }
}

impl SignatureService for Ed25519SignatureService {
    fn sign(&self, payload: &Hashable, context: &Hashable) -> PayloadSignature {
        self.keypair.sign(&signed_message(payload, context))
    }

    fn verify(
        &self,
        alias: &str,
        payload: &Hashable,
        context: &Hashable,
        signature: &PayloadSignature,
    ) -> bool {
        let key = match self.trusted_key(alias) {
            Ok(key) => key,
            Err(e) => {
                warn!("[crypto] {}", e);
                return false;
            }
        };
        key.verify(&signed_message(payload, context), signature)
            .is_ok()
    }
}
