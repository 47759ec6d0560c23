//! # Proof System Trait (Sealed)
//!
//! The core abstraction for zero-knowledge proof systems.
//!
//! ## Sealed Trait
//!
//! `ProofSystem` is **sealed**: only implementations defined within
//! `agora-zkp` can exist. A peer that accepts an attestation trusts the
//! backend that produced it, so downstream crates cannot inject their own.

use ark_bn254::Fr;
use ark_relations::r1cs::ConstraintSynthesizer;
use thiserror::Error;

/// Error during key generation or proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The circuit inputs are invalid, missing, or do not satisfy the
    /// constraints.
    #[error("invalid circuit inputs: {0}")]
    InvalidInputs(String),
    /// Key generation failed.
    #[error("circuit setup failed: {0}")]
    SetupFailed(String),
    /// Proof generation failed internally.
    #[error("proof generation failed: {0}")]
    GenerationFailed(String),
    /// A key or proof could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Error during proof verification.
///
/// A well-formed proof that simply does not verify is `Ok(false)`, not an
/// error.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The proof or its envelope is structurally malformed.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    /// The verifying key could not be decoded.
    #[error("malformed verifying key: {0}")]
    MalformedKey(String),
    /// A public input is not a canonical field element.
    #[error("malformed public input {name}: {reason}")]
    MalformedPublicInput {
        /// Which public input.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// The verifier rejected the proof before evaluating it.
    #[error("proof verification failed: {0}")]
    VerificationFailed(String),
}

/// A circuit over the BN254 scalar field that a [`ProofSystem`] can compile.
pub trait ArithmeticCircuit: ConstraintSynthesizer<Fr> + Clone + Send {
    /// Stable identifier used in logs and attestation envelopes.
    const NAME: &'static str;

    /// An instance with the right shape and no assignments, used for key
    /// generation.
    fn blank() -> Self;

    /// Public inputs in allocation order, or `None` for a blank instance.
    fn public_inputs(&self) -> Option<Vec<Fr>>;
}

mod private {
    pub trait Sealed {}
}

/// Sealed trait defining the interface for a zero-knowledge proof system.
///
/// `Send + Sync` so a single instance can serve concurrent provers and
/// verifiers.
pub trait ProofSystem: private::Sealed + Send + Sync {
    /// The proof artifact produced by `prove()`.
    type Proof: Clone + std::fmt::Debug;
    /// The key used to verify proofs; cloneable for distribution.
    type VerifyingKey: Clone;
    /// The key used to generate proofs. Large.
    type ProvingKey;
    /// The circuit that defines the proof statement.
    type Circuit;

    /// Generate circuit-specific proving and verifying keys.
    fn setup(&self) -> Result<(Self::ProvingKey, Self::VerifyingKey), ProofError>;

    /// Produce a proof that `circuit`'s witness satisfies its constraints.
    ///
    /// # Errors
    ///
    /// [`ProofError::InvalidInputs`] if assignments are missing or the
    /// witness does not satisfy the circuit.
    fn prove(
        &self,
        pk: &Self::ProvingKey,
        circuit: Self::Circuit,
    ) -> Result<Self::Proof, ProofError>;

    /// Verify a proof against public inputs.
    ///
    /// `Ok(true)` if valid, `Ok(false)` if well-formed but invalid.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[Fr],
    ) -> Result<bool, VerifyError>;
}

impl<C: ArithmeticCircuit> private::Sealed for crate::groth16::Groth16ProofSystem<C> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_error_display() {
        let err = ProofError::InvalidInputs("missing witness".into());
        assert_eq!(err.to_string(), "invalid circuit inputs: missing witness");
    }

    #[test]
    fn verify_error_display_names_input() {
        let err = VerifyError::MalformedPublicInput {
            name: "responseHash",
            reason: "not reduced".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed public input responseHash: not reduced"
        );
    }
}
