//! # agora-cli — Agora Node Command-Line Interface
//!
//! ## Subcommands
//!
//! - `serve`: run a node on TCP
//! - `call`: send one request to a node
//! - `keygen`: generate an agent secret
//! - `attest verify`: check a saved response against a saved agent card
//!
//! Argument parsing lives here; protocol, session, and policy logic live in
//! the library crates.

pub mod attest;
pub mod attestation;
pub mod call;
pub mod config;
pub mod keygen;
pub mod serve;
pub mod tools;
