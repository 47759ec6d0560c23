//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `agora-crypto`.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The operating system CSPRNG could not produce bytes.
    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    /// A key had an unusable length.
    #[error("invalid key length: {0}")]
    InvalidKeyLength(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(String),
}
