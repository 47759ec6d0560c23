//! # Response Attestation Circuit
//!
//! Proves two statements about a tool response without revealing the
//! agent's key or the source material:
//!
//! 1. **Authority.** `Poseidon(agentKeyProof) == agentDidHash`: the prover
//!    knows the preimage of the agent's published identity commitment.
//! 2. **Provenance.** `Poseidon(sourceDataHash, agentKeyProof, timestamp)
//!    == responseHash`: the disclosed response hash was derived from that
//!    same key, some source data, and the stated time.
//!
//! ## Public inputs (allocation order)
//!
//! `responseHash`, `agentDidHash`, `timestamp`.
//!
//! ## Witness
//!
//! `sourceDataHash`, `agentKeyProof`.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use agora_crypto::{field_to_bytes, poseidon_config, poseidon_hash};

use crate::traits::ArithmeticCircuit;

/// The public half of an attestation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationPublicInputs {
    /// `Poseidon(sourceDataHash, agentKeyProof, timestamp)`.
    pub response_hash: Fr,
    /// `Poseidon(agentKeyProof)`.
    pub agent_did_hash: Fr,
    /// UNIX seconds at proving time.
    pub timestamp: u64,
}

impl AttestationPublicInputs {
    /// Field elements in circuit allocation order.
    pub fn to_field_elements(&self) -> Vec<Fr> {
        vec![self.response_hash, self.agent_did_hash, Fr::from(self.timestamp)]
    }

    /// 32-byte big-endian encoding of the response hash.
    pub fn response_hash_bytes(&self) -> [u8; 32] {
        field_to_bytes(&self.response_hash)
    }

    /// 32-byte big-endian encoding of the agent identity commitment.
    pub fn agent_did_hash_bytes(&self) -> [u8; 32] {
        field_to_bytes(&self.agent_did_hash)
    }
}

/// One instance of the response attestation statement.
///
/// Fields are `Option` so a blank instance can drive key generation.
#[derive(Debug, Clone, Default)]
pub struct ResponseAttestationCircuit {
    pub response_hash: Option<Fr>,
    pub agent_did_hash: Option<Fr>,
    pub timestamp: Option<Fr>,
    pub source_data_hash: Option<Fr>,
    pub agent_key_proof: Option<Fr>,
}

impl ResponseAttestationCircuit {
    /// Build a satisfying instance from the private witness, computing the
    /// public inputs natively.
    pub fn from_witness(source_data_hash: Fr, agent_key_proof: Fr, timestamp: u64) -> Self {
        let t = Fr::from(timestamp);
        Self {
            response_hash: Some(poseidon_hash(&[source_data_hash, agent_key_proof, t])),
            agent_did_hash: Some(poseidon_hash(&[agent_key_proof])),
            timestamp: Some(t),
            source_data_hash: Some(source_data_hash),
            agent_key_proof: Some(agent_key_proof),
        }
    }
}

fn squeeze_one(sponge: &mut PoseidonSpongeVar<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
    sponge
        .squeeze_field_elements(1)?
        .into_iter()
        .next()
        .ok_or(SynthesisError::Unsatisfiable)
}

impl ConstraintSynthesizer<Fr> for ResponseAttestationCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let response_hash = FpVar::new_input(cs.clone(), || {
            self.response_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let agent_did_hash = FpVar::new_input(cs.clone(), || {
            self.agent_did_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let timestamp = FpVar::new_input(cs.clone(), || {
            self.timestamp.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let source_data_hash = FpVar::new_witness(cs.clone(), || {
            self.source_data_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let agent_key_proof = FpVar::new_witness(cs.clone(), || {
            self.agent_key_proof.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let config = poseidon_config();

        let mut authority = PoseidonSpongeVar::new(cs.clone(), config);
        authority.absorb(&agent_key_proof)?;
        squeeze_one(&mut authority)?.enforce_equal(&agent_did_hash)?;

        let mut provenance = PoseidonSpongeVar::new(cs, config);
        provenance.absorb(&source_data_hash)?;
        provenance.absorb(&agent_key_proof)?;
        provenance.absorb(&timestamp)?;
        squeeze_one(&mut provenance)?.enforce_equal(&response_hash)?;

        Ok(())
    }
}

impl ArithmeticCircuit for ResponseAttestationCircuit {
    const NAME: &'static str = "response-attestation";

    fn blank() -> Self {
        Self::default()
    }

    fn public_inputs(&self) -> Option<Vec<Fr>> {
        Some(vec![self.response_hash?, self.agent_did_hash?, self.timestamp?])
    }
}
