//! Session store errors.

use thiserror::Error;

use agora_crypto::CryptoError;

/// Errors from session creation and store configuration.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Token derivation failed, typically because the OS CSPRNG is
    /// unavailable.
    #[error("session token derivation failed: {0}")]
    TokenDerivation(#[from] CryptoError),

    /// The configured TTL is zero or out of range.
    #[error("invalid session TTL: {0}")]
    InvalidTtl(String),

    /// The sweeper interval is zero.
    #[error("cleanup interval must be greater than zero")]
    InvalidInterval,
}
