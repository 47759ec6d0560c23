//! # Wire Messages
//!
//! JSON field names and enum spellings are part of the protocol and must
//! not change: `type`, `sessionToken`, `requestID`, `payload` on requests;
//! `requestID`, `status`, `result`, `error`, `attestationProof`,
//! `timestamp` on responses.
//!
//! ## Invariants
//!
//! - `result` is present iff `status == ok`.
//! - `error` is present iff `status != ok`.
//! - `attestationProof` is hex on the wire and only ever accompanies `ok`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use agora_core::Timestamp;

/// Kind of request. Unrecognized strings are kept verbatim so the handler
/// can report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    AgentCard,
    CapabilityQuery,
    ToolInvoke,
    /// No `type` field was sent.
    #[default]
    Missing,
    Unknown(String),
}

impl RequestType {
    pub fn as_str(&self) -> &str {
        match self {
            RequestType::AgentCard => "agent_card",
            RequestType::CapabilityQuery => "capability_query",
            RequestType::ToolInvoke => "tool_invoke",
            RequestType::Missing => "",
            RequestType::Unknown(s) => s,
        }
    }
}

impl From<String> for RequestType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "agent_card" => RequestType::AgentCard,
            "capability_query" => RequestType::CapabilityQuery,
            "tool_invoke" => RequestType::ToolInvoke,
            "" => RequestType::Missing,
            _ => RequestType::Unknown(s),
        }
    }
}

impl From<RequestType> for String {
    fn from(t: RequestType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "type", default)]
    pub request_type: RequestType,
    #[serde(rename = "sessionToken", default)]
    pub session_token: String,
    #[serde(rename = "requestID", default)]
    pub request_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payload: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Denied,
    Error,
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ResponseStatus::Ok => "ok",
            ResponseStatus::Denied => "denied",
            ResponseStatus::Error => "error",
        })
    }
}

/// The single response written for each request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "requestID")]
    pub request_id: String,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "attestationProof",
        default,
        skip_serializing_if = "Option::is_none",
        with = "hex_opt"
    )]
    pub attestation_proof: Option<Vec<u8>>,
    pub timestamp: Timestamp,
}

impl Response {
    pub fn ok(request_id: impl Into<String>, result: Value) -> Self {
        Self {
            request_id: request_id.into(),
            status: ResponseStatus::Ok,
            result: Some(result),
            error: None,
            attestation_proof: None,
            timestamp: Timestamp::now(),
        }
    }

    pub fn denied(request_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::failure(request_id, ResponseStatus::Denied, reason)
    }

    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failure(request_id, ResponseStatus::Error, message)
    }

    fn failure(
        request_id: impl Into<String>,
        status: ResponseStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            status,
            result: None,
            error: Some(message.into()),
            attestation_proof: None,
            timestamp: Timestamp::now(),
        }
    }

    /// Attach a proof. Ignored unless the response is `ok`.
    pub fn with_attestation(mut self, proof: Option<Vec<u8>>) -> Self {
        if self.status == ResponseStatus::Ok {
            self.attestation_proof = proof;
        }
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

mod hex_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => s.serialize_str(&hex::encode(b)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
