//! # Response Attester and Verifier
//!
//! [`ResponseAttester`] owns an agent secret and the Groth16 keys for
//! [`ResponseAttestationCircuit`]. For each response it derives:
//!
//! - `agentKeyProof = Fr(HMAC-SHA256(agent_secret, identityHash))`, binding
//!   the secret to the local identity;
//! - `sourceDataHash = Fr(resultHash)`;
//! - `timestamp = now` in UNIX seconds;
//!
//! and proves the circuit statement. The output is an
//! [`AttestationBundle`], serialized as canonical JSON so it travels as the
//! opaque `attestationProof` bytes of a protocol response.
//!
//! ## Security Invariant
//!
//! The agent secret and the proving key never leave this type. `Debug`
//! redacts both. Verifiers need only the verifying key and the agent's
//! published `agentDidHash`.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{ProvingKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use agora_core::{CanonicalBytes, Timestamp};
use agora_crypto::{field_from_bytes, field_from_canonical_bytes, poseidon_hash, SecretKey};

use crate::circuits::attestation::{AttestationPublicInputs, ResponseAttestationCircuit};
use crate::groth16::{
    decode_proof, decode_verifying_key, encode_proof, encode_verifying_key, Groth16ProofSystem,
};
use crate::traits::{ProofError, ProofSystem, VerifyError};

/// Scheme tag carried in every bundle.
pub const ATTESTATION_SCHEME: &str = "groth16-bn254-poseidon";

type AttestationSystem = Groth16ProofSystem<ResponseAttestationCircuit>;

/// A proof plus the public inputs it was produced for.
///
/// Byte values are hex. Hashes are 32-byte big-endian encodings of BN254
/// scalar field elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationBundle {
    pub scheme: String,
    pub proof: String,
    pub response_hash: String,
    pub agent_did_hash: String,
    pub timestamp: u64,
}

impl AttestationBundle {
    /// Canonical JSON bytes, the form carried on the wire.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProofError> {
        CanonicalBytes::new(self)
            .map(CanonicalBytes::into_bytes)
            .map_err(|e| ProofError::Serialization(e.to_string()))
    }

    /// Parse wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifyError> {
        serde_json::from_slice(bytes).map_err(|e| VerifyError::MalformedProof(e.to_string()))
    }

    /// Decode and range-check the public inputs.
    pub fn public_inputs(&self) -> Result<AttestationPublicInputs, VerifyError> {
        Ok(AttestationPublicInputs {
            response_hash: parse_field("responseHash", &self.response_hash)?,
            agent_did_hash: parse_field("agentDidHash", &self.agent_did_hash)?,
            timestamp: self.timestamp,
        })
    }
}

fn parse_field(name: &'static str, hex_str: &str) -> Result<Fr, VerifyError> {
    let raw = hex::decode(hex_str).map_err(|e| VerifyError::MalformedPublicInput {
        name,
        reason: e.to_string(),
    })?;
    let bytes: [u8; 32] = raw
        .try_into()
        .map_err(|v: Vec<u8>| VerifyError::MalformedPublicInput {
            name,
            reason: format!("expected 32 bytes, got {}", v.len()),
        })?;
    field_from_canonical_bytes(&bytes).ok_or(VerifyError::MalformedPublicInput {
        name,
        reason: "not a reduced field element".into(),
    })
}

/// Produces response attestations for one agent.
pub struct ResponseAttester {
    agent_secret: SecretKey,
    proving_key: ProvingKey<Bn254>,
    verifier: AttestationVerifier,
    system: AttestationSystem,
}

impl std::fmt::Debug for ResponseAttester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseAttester")
            .field("agent_secret", &"[REDACTED]")
            .field("proving_key", &"[REDACTED]")
            .finish()
    }
}

impl ResponseAttester {
    /// Generate fresh circuit keys for `agent_secret`.
    ///
    /// Setup is the expensive step; call it once at node start.
    pub fn setup(agent_secret: SecretKey) -> Result<Self, ProofError> {
        let system = AttestationSystem::new();
        let (proving_key, verifying_key) = system.setup()?;
        Ok(Self::with_keys(agent_secret, proving_key, verifying_key))
    }

    /// Build from previously generated keys.
    pub fn with_keys(
        agent_secret: SecretKey,
        proving_key: ProvingKey<Bn254>,
        verifying_key: VerifyingKey<Bn254>,
    ) -> Self {
        Self {
            agent_secret,
            proving_key,
            verifier: AttestationVerifier::new(verifying_key),
            system: AttestationSystem::new(),
        }
    }

    /// The identity commitment `Poseidon(agentKeyProof)` an agent publishes
    /// so peers can check its attestations.
    pub fn agent_did_hash(&self, identity_hash: &[u8; 32]) -> Result<[u8; 32], ProofError> {
        agent_did_hash(&self.agent_secret, identity_hash)
    }

    /// Attest `result_hash` at the current time.
    pub fn attest(
        &self,
        result_hash: &[u8; 32],
        identity_hash: &[u8; 32],
    ) -> Result<AttestationBundle, ProofError> {
        self.attest_at(result_hash, identity_hash, Timestamp::now().unix_seconds())
    }

    /// Attest `result_hash` with an explicit UNIX timestamp.
    pub fn attest_at(
        &self,
        result_hash: &[u8; 32],
        identity_hash: &[u8; 32],
        timestamp: u64,
    ) -> Result<AttestationBundle, ProofError> {
        let k = agent_key_proof(&self.agent_secret, identity_hash)?;
        let circuit = ResponseAttestationCircuit::from_witness(field_from_bytes(result_hash), k, timestamp);
        let public = AttestationPublicInputs {
            response_hash: circuit
                .response_hash
                .ok_or_else(|| ProofError::InvalidInputs("response hash unassigned".into()))?,
            agent_did_hash: circuit
                .agent_did_hash
                .ok_or_else(|| ProofError::InvalidInputs("agent hash unassigned".into()))?,
            timestamp,
        };
        let proof = self.system.prove(&self.proving_key, circuit)?;
        Ok(AttestationBundle {
            scheme: ATTESTATION_SCHEME.to_string(),
            proof: hex::encode(encode_proof(&proof)?),
            response_hash: hex::encode(public.response_hash_bytes()),
            agent_did_hash: hex::encode(public.agent_did_hash_bytes()),
            timestamp,
        })
    }

    /// The verifier paired with this attester's keys.
    pub fn verifier(&self) -> &AttestationVerifier {
        &self.verifier
    }

    /// Compressed verifying key bytes for publication.
    pub fn verifying_key_bytes(&self) -> Result<Vec<u8>, ProofError> {
        self.verifier.verifying_key_bytes()
    }
}

fn agent_key_proof(secret: &SecretKey, identity_hash: &[u8; 32]) -> Result<Fr, ProofError> {
    let mac = secret
        .mac(&[identity_hash.as_slice()])
        .map_err(|e| ProofError::InvalidInputs(e.to_string()))?;
    Ok(field_from_bytes(&mac))
}

/// `Poseidon(HMAC(secret, identity_hash))`, computed without circuit keys.
pub fn agent_did_hash(secret: &SecretKey, identity_hash: &[u8; 32]) -> Result<[u8; 32], ProofError> {
    let k = agent_key_proof(secret, identity_hash)?;
    Ok(agora_crypto::field_to_bytes(&poseidon_hash(&[k])))
}

/// Checks attestation bundles against a verifying key.
#[derive(Clone)]
pub struct AttestationVerifier {
    verifying_key: VerifyingKey<Bn254>,
    system: AttestationSystem,
}

impl std::fmt::Debug for AttestationVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationVerifier").finish_non_exhaustive()
    }
}

impl AttestationVerifier {
    /// Wrap a verifying key.
    pub fn new(verifying_key: VerifyingKey<Bn254>) -> Self {
        Self {
            verifying_key,
            system: AttestationSystem::new(),
        }
    }

    /// Import a compressed verifying key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifyError> {
        Ok(Self::new(decode_verifying_key(bytes)?))
    }

    /// Compressed verifying key bytes.
    pub fn verifying_key_bytes(&self) -> Result<Vec<u8>, ProofError> {
        encode_verifying_key(&self.verifying_key)
    }

    /// Verify a bundle's proof against its own public inputs.
    pub fn verify(&self, bundle: &AttestationBundle) -> Result<bool, VerifyError> {
        if bundle.scheme != ATTESTATION_SCHEME {
            return Err(VerifyError::MalformedProof(format!(
                "unsupported scheme {:?}",
                bundle.scheme
            )));
        }
        let public = bundle.public_inputs()?;
        let proof_bytes =
            hex::decode(&bundle.proof).map_err(|e| VerifyError::MalformedProof(e.to_string()))?;
        let proof = decode_proof(&proof_bytes)?;
        self.system
            .verify(&self.verifying_key, &proof, &public.to_field_elements())
    }

    /// Verify a bundle and additionally require that it was produced by the
    /// agent whose published commitment is `expected_agent_did_hash`.
    pub fn verify_for_agent(
        &self,
        bundle: &AttestationBundle,
        expected_agent_did_hash: &[u8; 32],
    ) -> Result<bool, VerifyError> {
        if bundle.public_inputs()?.agent_did_hash_bytes() != *expected_agent_did_hash {
            return Ok(false);
        }
        self.verify(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn attester() -> &'static ResponseAttester {
        static ATTESTER: OnceLock<ResponseAttester> = OnceLock::new();
        ATTESTER.get_or_init(|| ResponseAttester::setup(SecretKey::from_bytes([42u8; 32])).unwrap())
    }

    fn bundle() -> &'static AttestationBundle {
        static BUNDLE: OnceLock<AttestationBundle> = OnceLock::new();
        BUNDLE.get_or_init(|| {
            attester()
                .attest_at(&[1u8; 32], &[2u8; 32], 1_700_000_000)
                .unwrap()
        })
    }

    fn flip_hex_bit(hex_str: &str, byte: usize, bit: u8) -> String {
        let mut raw = hex::decode(hex_str).unwrap();
        raw[byte] ^= 1 << bit;
        hex::encode(raw)
    }

    #[test]
    fn honest_bundle_verifies() {
        assert!(attester().verifier().verify(bundle()).unwrap());
    }

    #[test]
    fn wire_bytes_verify() {
        let bytes = bundle().to_bytes().unwrap();
        let decoded = AttestationBundle::from_bytes(&bytes).unwrap();
        assert!(attester().verifier().verify(&decoded).unwrap());
    }

    #[test]
    fn flipping_response_hash_bit_fails() {
        let mut b = bundle().clone();
        b.response_hash = flip_hex_bit(&b.response_hash, 31, 0);
        assert!(!matches!(attester().verifier().verify(&b), Ok(true)));
    }

    #[test]
    fn flipping_agent_hash_bit_fails() {
        let mut b = bundle().clone();
        b.agent_did_hash = flip_hex_bit(&b.agent_did_hash, 31, 0);
        assert!(!matches!(attester().verifier().verify(&b), Ok(true)));
    }

    #[test]
    fn flipping_timestamp_bit_fails() {
        let mut b = bundle().clone();
        b.timestamp ^= 1;
        assert!(!matches!(attester().verifier().verify(&b), Ok(true)));
    }

    #[test]
    fn flipping_proof_bit_fails() {
        let mut b = bundle().clone();
        b.proof = flip_hex_bit(&b.proof, 5, 3);
        assert!(!matches!(attester().verifier().verify(&b), Ok(true)));
    }

    #[test]
    fn agent_commitment_is_checked() {
        let expected = attester().agent_did_hash(&[2u8; 32]).unwrap();
        let verifier = attester().verifier();
        assert!(verifier.verify_for_agent(bundle(), &expected).unwrap());
        let other = attester().agent_did_hash(&[3u8; 32]).unwrap();
        assert!(!verifier.verify_for_agent(bundle(), &other).unwrap());
    }

    #[test]
    fn commitment_matches_bundle_without_keys() {
        let standalone = agent_did_hash(&SecretKey::from_bytes([42u8; 32]), &[2u8; 32]).unwrap();
        assert_eq!(hex::encode(standalone), bundle().agent_did_hash);
    }

    #[test]
    fn exported_key_verifies() {
        let bytes = attester().verifying_key_bytes().unwrap();
        let imported = AttestationVerifier::from_bytes(&bytes).unwrap();
        assert!(imported.verify(bundle()).unwrap());
    }

    #[test]
    fn unknown_scheme_is_malformed() {
        let mut b = bundle().clone();
        b.scheme = "plonk".into();
        assert!(matches!(
            attester().verifier().verify(&b),
            Err(VerifyError::MalformedProof(_))
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let dbg = format!("{:?}", attester());
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        assert!(AttestationBundle::from_bytes(b"not json").is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Tampered {
            ResponseHash,
            AgentDidHash,
            Timestamp,
            Proof,
        }

        fn tampered() -> impl Strategy<Value = Tampered> {
            prop_oneof![
                Just(Tampered::ResponseHash),
                Just(Tampered::AgentDidHash),
                Just(Tampered::Timestamp),
                Just(Tampered::Proof),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn any_single_bit_flip_is_rejected(
                target in tampered(),
                byte in any::<usize>(),
                bit in 0u8..8,
            ) {
                let mut b = bundle().clone();
                match target {
                    Tampered::ResponseHash => {
                        b.response_hash = flip_hex_bit(&b.response_hash, byte % 32, bit);
                    }
                    Tampered::AgentDidHash => {
                        b.agent_did_hash = flip_hex_bit(&b.agent_did_hash, byte % 32, bit);
                    }
                    Tampered::Timestamp => b.timestamp ^= 1u64 << (byte % 64),
                    Tampered::Proof => {
                        let len = b.proof.len() / 2;
                        b.proof = flip_hex_bit(&b.proof, byte % len, bit);
                    }
                }
                prop_assert!(!matches!(attester().verifier().verify(&b), Ok(true)));
            }
        }
    }
}
