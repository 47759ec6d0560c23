//! # Groth16 Proof System
//!
//! Groth16 over BN254 via `ark-groth16`.
//!
//! ## Properties
//!
//! - **Proof size:** 128 bytes compressed, independent of circuit size.
//! - **Verification time:** constant (3 pairings).
//! - **Trusted setup:** circuit-specific. [`Groth16ProofSystem::setup`]
//!   runs a local, single-party setup; the proving key must therefore stay
//!   with the agent that generated it.

use std::marker::PhantomData;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use rand_core::OsRng;

use crate::traits::{ArithmeticCircuit, ProofError, ProofSystem, VerifyError};

/// A Groth16 proof on BN254.
pub type Groth16Proof = Proof<Bn254>;

/// Groth16 backend for a single circuit type `C`.
pub struct Groth16ProofSystem<C> {
    _circuit: PhantomData<fn() -> C>,
}

impl<C> Groth16ProofSystem<C> {
    /// Create the backend.
    pub fn new() -> Self {
        Self {
            _circuit: PhantomData,
        }
    }
}

impl<C> Default for Groth16ProofSystem<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for Groth16ProofSystem<C> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for Groth16ProofSystem<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Groth16ProofSystem").finish()
    }
}

impl<C: ArithmeticCircuit> Groth16ProofSystem<C> {
    /// Synthesize `circuit` in prove mode and report whether the witness
    /// satisfies every constraint.
    ///
    /// The arkworks prover does not reject unsatisfied witnesses itself; it
    /// either debug-asserts or emits a proof that will never verify.
    fn check_satisfied(circuit: C) -> Result<(), ProofError> {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit
            .generate_constraints(cs.clone())
            .map_err(|e| ProofError::InvalidInputs(e.to_string()))?;
        let satisfied = cs
            .is_satisfied()
            .map_err(|e| ProofError::InvalidInputs(e.to_string()))?;
        if !satisfied {
            let which = cs.which_is_unsatisfied().ok().flatten().unwrap_or_default();
            return Err(ProofError::InvalidInputs(format!(
                "witness does not satisfy {} constraints: {which}",
                C::NAME
            )));
        }
        Ok(())
    }
}

impl<C: ArithmeticCircuit> ProofSystem for Groth16ProofSystem<C> {
    type Proof = Groth16Proof;
    type VerifyingKey = VerifyingKey<Bn254>;
    type ProvingKey = ProvingKey<Bn254>;
    type Circuit = C;

    fn setup(&self) -> Result<(Self::ProvingKey, Self::VerifyingKey), ProofError> {
        let keys = <Groth16<Bn254> as SNARK<Fr>>::circuit_specific_setup(C::blank(), &mut OsRng)
            .map_err(|e| ProofError::SetupFailed(e.to_string()))?;
        tracing::debug!(circuit = C::NAME, "groth16 keys generated");
        Ok(keys)
    }

    fn prove(
        &self,
        pk: &Self::ProvingKey,
        circuit: Self::Circuit,
    ) -> Result<Self::Proof, ProofError> {
        Self::check_satisfied(circuit.clone())?;
        <Groth16<Bn254> as SNARK<Fr>>::prove(pk, circuit, &mut OsRng)
            .map_err(|e| ProofError::GenerationFailed(e.to_string()))
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[Fr],
    ) -> Result<bool, VerifyError> {
        if public_inputs.len() + 1 != vk.gamma_abc_g1.len() {
            return Err(VerifyError::VerificationFailed(format!(
                "{} expects {} public inputs, got {}",
                C::NAME,
                vk.gamma_abc_g1.len().saturating_sub(1),
                public_inputs.len()
            )));
        }
        <Groth16<Bn254> as SNARK<Fr>>::verify(vk, public_inputs, proof)
            .map_err(|e| VerifyError::VerificationFailed(e.to_string()))
    }
}

/// Compressed encoding of a proof.
pub fn encode_proof(proof: &Groth16Proof) -> Result<Vec<u8>, ProofError> {
    let mut out = Vec::new();
    proof
        .serialize_compressed(&mut out)
        .map_err(|e| ProofError::Serialization(e.to_string()))?;
    Ok(out)
}

/// Decode a compressed proof, validating that every point is on the curve
/// and in the prime-order subgroup.
pub fn decode_proof(bytes: &[u8]) -> Result<Groth16Proof, VerifyError> {
    Groth16Proof::deserialize_compressed(bytes).map_err(|e| VerifyError::MalformedProof(e.to_string()))
}

/// Compressed encoding of a verifying key.
pub fn encode_verifying_key(vk: &VerifyingKey<Bn254>) -> Result<Vec<u8>, ProofError> {
    let mut out = Vec::new();
    vk.serialize_compressed(&mut out)
        .map_err(|e| ProofError::Serialization(e.to_string()))?;
    Ok(out)
}

/// Decode a compressed verifying key.
pub fn decode_verifying_key(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, VerifyError> {
    VerifyingKey::<Bn254>::deserialize_compressed(bytes)
        .map_err(|e| VerifyError::MalformedKey(e.to_string()))
}
