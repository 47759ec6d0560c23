#![deny(missing_docs)]

//! # agora-core — Foundational Types for Agora
//!
//! The leaf crate of the workspace. Every other `agora-*` crate depends on
//! it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated identity.** Peer and agent identities are [`Did`] values,
//!    checked against `did:<method>:<id>` at construction and at
//!    deserialization. No bare strings cross crate boundaries as identities.
//!
//! 2. **`CanonicalBytes` newtype.** Every hash over structured data (tool
//!    results in particular) flows through [`CanonicalBytes::new()`], so two
//!    peers hashing the same JSON value always agree on the digest.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] wraps `DateTime<Utc>`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `agora-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_bytes, sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::Did;
pub use temporal::Timestamp;
