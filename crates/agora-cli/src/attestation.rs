//! # Publishing and Checking Attestations
//!
//! A node publishes its verifying key and agent commitment in its card.
//! A caller checks an attested response against that card: the proof must
//! verify under the published key and its public agent commitment must
//! equal the published one.
//!
//! The response hash inside the proof is derived from private witness
//! material, so the proof binds the agent and the time. It does not let a
//! third party recompute the hash from the result.

use anyhow::{bail, Context, Result};

use agora_core::{sha256_bytes, Did};
use agora_protocol::{AgentCard, CardAttestation, Response};
use agora_zkp::{AttestationBundle, AttestationVerifier, ResponseAttester, ATTESTATION_SCHEME};

/// `SHA-256(did)`, the identity input to the agent commitment.
pub fn identity_hash(did: &Did) -> [u8; 32] {
    sha256_bytes(did.as_str().as_bytes())
}

/// Card section describing `attester`'s keys for `did`.
pub fn card_attestation(attester: &ResponseAttester, did: &Did) -> Result<CardAttestation> {
    let agent_did_hash = attester
        .agent_did_hash(&identity_hash(did))
        .context("failed to derive agent commitment")?;
    let verifying_key = attester
        .verifying_key_bytes()
        .context("failed to encode verifying key")?;
    Ok(CardAttestation {
        scheme: ATTESTATION_SCHEME.to_string(),
        agent_did_hash: hex::encode(agent_did_hash),
        verifying_key: hex::encode(verifying_key),
    })
}

/// Check the proof carried by `response` against `card`.
///
/// `Ok(false)` means the proof is well formed but does not verify.
pub fn verify_response(card: &AgentCard, response: &Response) -> Result<bool> {
    let proof = response
        .attestation_proof
        .as_deref()
        .context("response carries no attestation")?;
    let bundle = AttestationBundle::from_bytes(proof).context("malformed attestation bundle")?;
    verify_bundle(card, &bundle)
}

/// Check a decoded bundle against `card`.
pub fn verify_bundle(card: &AgentCard, bundle: &AttestationBundle) -> Result<bool> {
    let published = card
        .attestation
        .as_ref()
        .context("agent card publishes no attestation key")?;
    if published.scheme != ATTESTATION_SCHEME {
        bail!("unsupported attestation scheme {:?}", published.scheme);
    }

    let vk = hex::decode(&published.verifying_key).context("verifying key is not hex")?;
    let verifier = AttestationVerifier::from_bytes(&vk).context("malformed verifying key")?;

    let commitment: [u8; 32] = hex::decode(&published.agent_did_hash)
        .context("agent commitment is not hex")?
        .try_into()
        .map_err(|raw: Vec<u8>| anyhow::anyhow!("agent commitment is {} bytes, expected 32", raw.len()))?;

    Ok(verifier.verify_for_agent(bundle, &commitment)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    use agora_crypto::SecretKey;
    use serde_json::json;

    fn did() -> Did {
        Did::new("did:key:z6MkAttest").unwrap()
    }

    fn attester() -> &'static ResponseAttester {
        static ATTESTER: OnceLock<ResponseAttester> = OnceLock::new();
        ATTESTER.get_or_init(|| ResponseAttester::setup(SecretKey::from_bytes([3u8; 32])).unwrap())
    }

    fn card() -> AgentCard {
        AgentCard::new("attester", did()).with_attestation(card_attestation(attester(), &did()).unwrap())
    }

    fn attested_response() -> Response {
        let bundle = attester()
            .attest(&[8u8; 32], &identity_hash(&did()))
            .unwrap();
        Response::ok("r", json!({"ok": true})).with_attestation(Some(bundle.to_bytes().unwrap()))
    }

    #[test]
    fn response_verifies_against_published_card() {
        assert!(verify_response(&card(), &attested_response()).unwrap());
    }

    #[test]
    fn proof_from_other_identity_fails() {
        let bundle = attester().attest(&[8u8; 32], &[0u8; 32]).unwrap();
        let response = Response::ok("r", json!(1)).with_attestation(Some(bundle.to_bytes().unwrap()));
        assert!(!verify_response(&card(), &response).unwrap());
    }

    #[test]
    fn missing_pieces_are_errors() {
        let bare = Response::ok("r", json!(1));
        assert!(verify_response(&card(), &bare).is_err());

        let no_key = AgentCard::new("plain", did());
        assert!(verify_response(&no_key, &attested_response()).is_err());
    }

    #[test]
    fn foreign_scheme_is_rejected() {
        let mut card = card();
        if let Some(att) = card.attestation.as_mut() {
            att.scheme = "plonk".into();
        }
        let err = verify_response(&card, &attested_response()).unwrap_err();
        assert!(err.to_string().contains("plonk"));
    }
}
