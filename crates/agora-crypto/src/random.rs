//! # OS Randomness
//!
//! Thin wrapper over `rand_core::OsRng` that reports entropy failure as an
//! error instead of panicking. Session creation depends on this to fail
//! closed.

use rand_core::{OsRng, RngCore};

use crate::error::CryptoError;

/// Fill a fixed-size array from the operating system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::RandomnessUnavailable(e.to_string()))?;
    Ok(buf)
}
