//! # Shared Crypto
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Recursive SHA3-256 | Structured hashing of payloads and contexts |
//! | `encoding` | Base64 (standard, padded) | Commitment hash encoding |
//! | `agreement` | Recursive hash + Base64 | Cross-node agreement commitments |
//! | `signatures` | Ed25519 | Payload signing between nodes |
//!
//! The hashing and group primitives are treated as correct building blocks;
//! the agreement protocol only composes them.

pub mod agreement;
pub mod encoding;
pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use agreement::{AgreementHasher, VERIFY_LVCC_HASH_LABEL};
pub use encoding::{base64_decode, base64_encode};
pub use errors::CryptoError;
pub use hashing::{recursive_hash, recursive_hash_of, Hash, Hashable, ToHashable};
pub use signatures::{
    Ed25519KeyPair, Ed25519PublicKey, Ed25519SignatureService, PayloadSignature,
    SignatureService,
};
