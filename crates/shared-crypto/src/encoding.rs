//! Base64 codec (standard alphabet, padded).

use crate::errors::CryptoError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode bytes as padded standard Base64.
pub fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode padded standard Base64.
pub fn base64_decode(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| CryptoError::InvalidBase64(e.to_string()))
}
