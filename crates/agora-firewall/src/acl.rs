//! # Access Control Rules
//!
//! A rule names a peer (`"*"` for any peer), an action, and a list of tool
//! patterns. A pattern is `*`, an exact tool name, or a `prefix*`. An empty
//! pattern list matches every tool.
//!
//! Evaluation: any matching deny rule refuses the call; otherwise at least
//! one matching allow rule is required.

use serde::{Deserialize, Serialize};

use agora_core::Did;

use crate::gate::PolicyDenied;

/// Wildcard that matches any peer or any tool.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Allow,
    Deny,
}

/// One ACL entry, written `{ peerDid, action, tools }` in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRule {
    pub peer_did: String,
    pub action: RuleAction,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl AclRule {
    pub fn allow(peer_did: impl Into<String>, tools: &[&str]) -> Self {
        Self {
            peer_did: peer_did.into(),
            action: RuleAction::Allow,
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn deny(peer_did: impl Into<String>, tools: &[&str]) -> Self {
        Self {
            peer_did: peer_did.into(),
            action: RuleAction::Deny,
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn matches_peer(&self, peer: &Did) -> bool {
        self.peer_did == WILDCARD || self.peer_did == peer.as_str()
    }

    fn matches_tool(&self, tool: &str) -> bool {
        self.tools.is_empty() || self.tools.iter().any(|p| pattern_matches(p, tool))
    }

    /// Whether this rule applies to `peer` calling `tool`.
    pub fn matches(&self, peer: &Did, tool: &str) -> bool {
        self.matches_peer(peer) && self.matches_tool(tool)
    }
}

fn pattern_matches(pattern: &str, tool: &str) -> bool {
    if pattern == WILDCARD {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => tool.starts_with(prefix),
        None => pattern == tool,
    }
}

/// Evaluate `rules` for one call: deny overrides allow, default deny.
pub fn evaluate(rules: &[AclRule], peer: &Did, tool: &str) -> Result<(), PolicyDenied> {
    let mut allowed = false;
    for rule in rules.iter().filter(|r| r.matches(peer, tool)) {
        match rule.action {
            RuleAction::Deny => {
                return Err(PolicyDenied::RuleDenied {
                    tool: tool.to_string(),
                })
            }
            RuleAction::Allow => allowed = true,
        }
    }
    if allowed {
        Ok(())
    } else {
        Err(PolicyDenied::NotAllowed {
            tool: tool.to_string(),
        })
    }
}
