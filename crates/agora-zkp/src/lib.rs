//! # agora-zkp — Zero-Knowledge Response Attestation
//!
//! Proves that a tool result returned to a peer was produced by the agent
//! that owns a given identity, without revealing the agent's secret or the
//! source material the result was derived from.
//!
//! ## Architecture
//!
//! - [`ProofSystem`] is a sealed trait (setup, prove, verify). The only
//!   backend is [`Groth16ProofSystem`] on BN254 via arkworks. Keys are
//!   produced once per circuit and reused for every proof.
//! - [`ResponseAttestationCircuit`] is the R1CS statement:
//!   `Poseidon(k) == agentDidHash` and
//!   `Poseidon(s, k, t) == responseHash`, with `k` and `s` private.
//! - [`ResponseAttester`] derives the witness from an agent secret and a
//!   result hash and emits an [`AttestationBundle`]; [`AttestationVerifier`]
//!   checks bundles using only the verifying key and public inputs.

pub mod attester;
pub mod circuits;
pub mod groth16;
pub mod traits;

pub use attester::{
    agent_did_hash, AttestationBundle, AttestationVerifier, ResponseAttester, ATTESTATION_SCHEME,
};
pub use circuits::attestation::{AttestationPublicInputs, ResponseAttestationCircuit};
pub use groth16::{Groth16ProofSystem, Groth16Proof};
pub use traits::{ArithmeticCircuit, ProofError, ProofSystem, VerifyError};
