//! # agora-crypto — Cryptographic Primitives for Agora
//!
//! - **Randomness** from the operating system CSPRNG, surfaced as a
//!   `Result` so callers can fail closed when entropy is unavailable.
//! - **HMAC-SHA256** keyed derivation for session tokens and agent key
//!   proofs, with keys that zeroize on drop.
//! - **Constant-time comparison** for every secret-dependent equality check.
//! - **Poseidon** over the BN254 scalar field, shared verbatim between native
//!   hashing and the in-circuit gadget in `agora-zkp`.

pub mod ct;
pub mod error;
pub mod mac;
pub mod poseidon;
pub mod random;

pub use ct::constant_time_eq;
pub use error::CryptoError;
pub use mac::{hmac_sha256, SecretKey};
pub use poseidon::{
    field_from_bytes, field_from_canonical_bytes, field_to_bytes, poseidon_config, poseidon_hash,
};
pub use random::random_bytes;
