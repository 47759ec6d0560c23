//! # Request Handler
//!
//! Serves exactly one request per stream:
//!
//! ```text
//! Received ──auth fails──▶ Denied ─────────────┐
//!    │                                          ▼
//!    └──auth ok──▶ Authenticated ──▶ Dispatched ──▶ Responded (stream closed)
//! ```
//!
//! For `tool_invoke`, the policy gate is consulted before the executor, the
//! result is sanitized before it is hashed or serialized, and attestation
//! is best effort: a failed proof never downgrades an `ok` response.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tokio::io::AsyncWriteExt;

use agora_core::{sha256_bytes, sha256_digest, CanonicalBytes, Did};
use agora_firewall::PolicyGate;
use agora_session::SessionStore;

use crate::codec::{self, DEFAULT_MAX_MESSAGE_BYTES};
use crate::executor::{CardProvider, ToolExecutor};
use crate::message::{Request, RequestType, Response};
use crate::stream::Stream;

const INVALID_SESSION: &str = "invalid or expired session token";
const CARD_UNAVAILABLE: &str = "agent card not available";
const MISSING_TOOL_NAME: &str = "missing toolName in payload";

/// Stateless request handler. Cheap to clone; one instance serves any
/// number of concurrent streams.
#[derive(Clone)]
pub struct ProtocolHandler {
    local_did: Did,
    identity_hash: [u8; 32],
    sessions: Arc<SessionStore>,
    gate: Arc<dyn PolicyGate>,
    executor: Arc<dyn ToolExecutor>,
    card: Option<Arc<dyn CardProvider>>,
    max_message_bytes: usize,
}

impl std::fmt::Debug for ProtocolHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolHandler")
            .field("local_did", &self.local_did)
            .field("sessions", &self.sessions.len())
            .field("card", &self.card.is_some())
            .field("max_message_bytes", &self.max_message_bytes)
            .finish()
    }
}

impl ProtocolHandler {
    /// Build a handler serving `local_did`.
    ///
    /// No card provider is set; `agent_card` answers `error` until one is
    /// attached with [`with_card_provider`](Self::with_card_provider).
    pub fn new(
        local_did: Did,
        sessions: Arc<SessionStore>,
        gate: Arc<dyn PolicyGate>,
        executor: Arc<dyn ToolExecutor>,
    ) -> Self {
        let identity_hash = sha256_bytes(local_did.as_str().as_bytes());
        Self {
            local_did,
            identity_hash,
            sessions,
            gate,
            executor,
            card: None,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Serve `card` for `agent_card` and `capability_query`.
    pub fn with_card_provider(mut self, card: Arc<dyn CardProvider>) -> Self {
        self.card = Some(card);
        self
    }

    /// Cap on the size of one request frame.
    pub fn with_max_message_bytes(mut self, max: usize) -> Self {
        self.max_message_bytes = max;
        self
    }

    pub fn local_did(&self) -> &Did {
        &self.local_did
    }

    /// Read one request, write one response, close the stream.
    pub async fn handle_stream<S: Stream>(&self, mut stream: S) {
        let response = match codec::read_message::<_, Request>(&mut stream, self.max_message_bytes).await
        {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode request");
                Response::error("", format!("decode request: {e}"))
            }
        };

        if let Err(e) = codec::write_message(&mut stream, &response).await {
            tracing::warn!(request_id = %response.request_id, error = %e, "failed to write response");
        }
        if let Err(e) = stream.shutdown().await {
            tracing::debug!(error = %e, "stream shutdown failed");
        }
    }

    /// Authenticate and dispatch a decoded request.
    pub async fn handle_request(&self, request: Request) -> Response {
        let Request {
            request_type,
            session_token,
            request_id,
            payload,
        } = request;

        let Some(session) = self.sessions.authenticate(&session_token) else {
            tracing::warn!(request_id = %request_id, kind = %request_type, "rejected request with invalid session");
            return Response::denied(request_id, INVALID_SESSION);
        };
        let peer = session.peer_did;
        tracing::debug!(request_id = %request_id, peer = %peer, kind = %request_type, "request authenticated");

        match request_type {
            RequestType::AgentCard => match &self.card {
                Some(provider) => Response::ok(request_id, provider.card()),
                None => Response::error(request_id, CARD_UNAVAILABLE),
            },
            RequestType::CapabilityQuery => match &self.card {
                Some(provider) => Response::ok(request_id, provider.card()),
                None => Response::ok(request_id, json!({ "capabilities": [] })),
            },
            RequestType::ToolInvoke => self.invoke_tool(request_id, &peer, payload).await,
            other => Response::error(request_id, format!("unknown request type: {other}")),
        }
    }

    async fn invoke_tool(
        &self,
        request_id: String,
        peer: &Did,
        mut payload: Map<String, Value>,
    ) -> Response {
        let tool = match payload.get("toolName").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Response::error(request_id, MISSING_TOOL_NAME),
        };

        if let Err(denied) = self.gate.filter_query(peer, &tool) {
            tracing::warn!(request_id = %request_id, peer = %peer, tool = %tool, reason = %denied, "tool call denied");
            return Response::denied(request_id, denied.to_string());
        }

        let params = match payload.remove("params") {
            Some(Value::Object(params)) => params,
            _ => Map::new(),
        };

        let result = match self.executor.execute(&tool, params).await {
            Ok(result) => result,
            Err(e) => {
                tracing::info!(request_id = %request_id, tool = %tool, error = %e, "tool execution failed");
                return Response::error(request_id, e.to_string());
            }
        };

        let result = self.gate.sanitize_response(result);
        let proof = self.attest(&request_id, &result).await;
        tracing::info!(
            request_id = %request_id,
            peer = %peer,
            tool = %tool,
            attested = proof.is_some(),
            "tool call served"
        );
        Response::ok(request_id, result).with_attestation(proof)
    }

    async fn attest(&self, request_id: &str, result: &Value) -> Option<Vec<u8>> {
        let canonical = match CanonicalBytes::new(result) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(request_id, error = %e, "cannot canonicalize result for attestation");
                return None;
            }
        };
        let result_hash = *sha256_digest(&canonical).as_bytes();
        let identity_hash = self.identity_hash;
        let gate = Arc::clone(&self.gate);

        match tokio::task::spawn_blocking(move || gate.attest_response(&result_hash, &identity_hash))
            .await
        {
            Ok(Ok(proof)) => Some(proof),
            Ok(Err(e)) => {
                tracing::debug!(request_id, error = %e, "response sent without attestation");
                None
            }
            Err(e) => {
                tracing::warn!(request_id, error = %e, "attestation task failed");
                None
            }
        }
    }
}
