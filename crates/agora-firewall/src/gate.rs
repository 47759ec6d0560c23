//! The policy gate contract.

use serde_json::Value;
use thiserror::Error;

use agora_core::Did;
use agora_zkp::ProofError;

/// Why a tool call was refused. The `Display` text is sent to the peer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyDenied {
    /// An explicit deny rule matched.
    #[error("firewall rule denies tool {tool:?}")]
    RuleDenied { tool: String },

    /// No allow rule matched.
    #[error("no firewall rule allows tool {tool:?}")]
    NotAllowed { tool: String },

    /// The peer exceeded its request quota.
    #[error("rate limit exceeded")]
    RateLimited,
}

/// Why an attestation could not be produced. Never sent to the peer; the
/// response simply goes out without a proof.
#[derive(Error, Debug)]
pub enum AttestationError {
    /// No attester is configured.
    #[error("attestation unavailable: no attester configured")]
    Unavailable,

    /// Proof generation failed.
    #[error("attestation failed: {0}")]
    Proof(#[from] ProofError),
}

/// Authorization, redaction, and attestation for tool calls.
pub trait PolicyGate: Send + Sync {
    /// Decide whether `peer` may invoke `tool_name`.
    fn filter_query(&self, peer: &Did, tool_name: &str) -> Result<(), PolicyDenied>;

    /// Remove sensitive content from a tool result.
    ///
    /// Must be idempotent and must never add fields.
    fn sanitize_response(&self, result: Value) -> Value;

    /// Produce an opaque attestation binding `result_hash` to the local
    /// agent identified by `identity_hash`. CPU-bound; may be slow.
    fn attest_response(
        &self,
        result_hash: &[u8; 32],
        identity_hash: &[u8; 32],
    ) -> Result<Vec<u8>, AttestationError>;
}
