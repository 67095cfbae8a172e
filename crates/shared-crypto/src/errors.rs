//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Input is not valid Base64
    #[error("Invalid Base64: {0}")]
    InvalidBase64(String),

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// No key registered under the alias
    #[error("Unknown keystore alias: {0}")]
    UnknownAlias(String),
}
