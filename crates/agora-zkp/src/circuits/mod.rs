//! # Circuit Definitions
//!
//! Each circuit is a plain data struct implementing arkworks'
//! `ConstraintSynthesizer` plus [`ArithmeticCircuit`](crate::ArithmeticCircuit)
//! for key generation and public-input extraction.

pub mod attestation;
