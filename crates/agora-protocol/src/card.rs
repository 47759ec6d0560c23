//! # Agent Card
//!
//! Self-description served to authenticated peers. When the node attests
//! its responses, the card carries what a peer needs to check them: the
//! scheme name, the agent commitment, and the verifying key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use agora_core::Did;

use crate::executor::CardProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Verification material for attested responses. Byte fields are hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAttestation {
    pub scheme: String,
    pub agent_did_hash: String,
    pub verifying_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub did: Did,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<CardAttestation>,
}

impl AgentCard {
    pub fn new(name: impl Into<String>, did: Did) -> Self {
        Self {
            name: name.into(),
            did,
            description: None,
            version: None,
            capabilities: Vec::new(),
            tools: Vec::new(),
            attestation: None,
        }
    }

    /// Advertise a tool and add it to the capability list.
    pub fn with_tool(mut self, name: impl Into<String>, description: Option<String>) -> Self {
        let name = name.into();
        if !self.capabilities.contains(&name) {
            self.capabilities.push(name.clone());
        }
        self.tools.push(ToolDescriptor { name, description });
        self
    }

    pub fn with_attestation(mut self, attestation: CardAttestation) -> Self {
        self.attestation = Some(attestation);
        self
    }
}

impl CardProvider for AgentCard {
    fn card(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn card_serializes_camel_case_and_omits_empty_options() {
        let card = AgentCard::new("echo-agent", Did::new("did:key:z6Mk").unwrap())
            .with_tool("echo", Some("returns its params".into()))
            .with_attestation(CardAttestation {
                scheme: "groth16-bn254-poseidon".into(),
                agent_did_hash: "00".into(),
                verifying_key: "ff".into(),
            });
        let v = card.card();
        assert_eq!(v["name"], json!("echo-agent"));
        assert_eq!(v["did"], json!("did:key:z6Mk"));
        assert_eq!(v["capabilities"], json!(["echo"]));
        assert_eq!(v["tools"][0]["description"], json!("returns its params"));
        assert_eq!(v["attestation"]["agentDidHash"], json!("00"));
        assert_eq!(v["attestation"]["verifyingKey"], json!("ff"));
        assert!(v.get("version").is_none());

        let back: AgentCard = serde_json::from_value(v).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn duplicate_tool_keeps_one_capability() {
        let card = AgentCard::new("a", Did::new("did:key:a").unwrap())
            .with_tool("echo", None)
            .with_tool("echo", None);
        assert_eq!(card.capabilities, vec!["echo".to_string()]);
    }
}
