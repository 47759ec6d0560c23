//! # Firewall
//!
//! The production [`PolicyGate`]. Rules are held behind a `RwLock` so an
//! operator can add or revoke them while the node is serving.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use agora_core::Did;
use agora_zkp::ResponseAttester;

use crate::acl::{self, AclRule};
use crate::gate::{AttestationError, PolicyDenied, PolicyGate};
use crate::redact::{Redactor, DEFAULT_REDACT_KEYS};

/// Firewall settings as they appear in node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    pub rules: Vec<AclRule>,
    /// Tool calls per peer per minute. `0` disables the limit.
    pub rate_limit_per_minute: u32,
    pub redact_keys: Vec<String>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            rate_limit_per_minute: 0,
            redact_keys: DEFAULT_REDACT_KEYS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// ACL, rate limit, redaction, and optional attestation behind one
/// [`PolicyGate`].
///
/// Rules may be changed while the node serves; each call evaluates the rule
/// set as it stands at that moment.
pub struct Firewall {
    rules: RwLock<Vec<AclRule>>,
    limiter: Option<DefaultKeyedRateLimiter<String>>,
    redactor: Redactor,
    attester: Option<Arc<ResponseAttester>>,
}

impl std::fmt::Debug for Firewall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Firewall")
            .field("rules", &self.rules.read().len())
            .field("rate_limited", &self.limiter.is_some())
            .field("redactor", &self.redactor)
            .field("attester", &self.attester.is_some())
            .finish()
    }
}

impl Firewall {
    pub fn new(config: FirewallConfig) -> Self {
        let limiter = NonZeroU32::new(config.rate_limit_per_minute)
            .map(|per_minute| RateLimiter::keyed(Quota::per_minute(per_minute)));
        Self {
            rules: RwLock::new(config.rules),
            limiter,
            redactor: Redactor::new(&config.redact_keys),
            attester: None,
        }
    }

    /// Attach the attester used by [`PolicyGate::attest_response`].
    pub fn with_attester(mut self, attester: Arc<ResponseAttester>) -> Self {
        self.attester = Some(attester);
        self
    }

    pub fn add_rule(&self, rule: AclRule) {
        tracing::info!(peer = %rule.peer_did, action = ?rule.action, tools = ?rule.tools, "firewall rule added");
        self.rules.write().push(rule);
    }

    /// Remove every rule naming exactly `peer_did`. Returns the count.
    pub fn remove_rules_for_peer(&self, peer_did: &str) -> usize {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| r.peer_did != peer_did);
        before - rules.len()
    }

    pub fn rules(&self) -> Vec<AclRule> {
        self.rules.read().clone()
    }

    /// Drop limiter state for peers whose quota has fully replenished and
    /// return how many peers are still tracked.
    ///
    /// The keyed limiter keeps one entry per peer it has ever checked, so a
    /// long-running node calls this periodically.
    pub fn retain_recent_rate_limits(&self) -> usize {
        match &self.limiter {
            Some(limiter) => {
                limiter.retain_recent();
                limiter.shrink_to_fit();
                limiter.len()
            }
            None => 0,
        }
    }
}

impl PolicyGate for Firewall {
    fn filter_query(&self, peer: &Did, tool_name: &str) -> Result<(), PolicyDenied> {
        acl::evaluate(&self.rules.read(), peer, tool_name)?;
        if let Some(limiter) = &self.limiter {
            if limiter.check_key(&peer.as_str().to_string()).is_err() {
                return Err(PolicyDenied::RateLimited);
            }
        }
        Ok(())
    }

    fn sanitize_response(&self, result: Value) -> Value {
        self.redactor.redact(result)
    }

    fn attest_response(
        &self,
        result_hash: &[u8; 32],
        identity_hash: &[u8; 32],
    ) -> Result<Vec<u8>, AttestationError> {
        let attester = self.attester.as_ref().ok_or(AttestationError::Unavailable)?;
        let bundle = attester.attest(result_hash, identity_hash)?;
        Ok(bundle.to_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_crypto::SecretKey;
    use agora_zkp::AttestationBundle;
    use serde_json::json;

    fn alice() -> Did {
        Did::new("did:key:alice").unwrap()
    }

    fn open_config() -> FirewallConfig {
        FirewallConfig {
            rules: vec![AclRule::allow("*", &["*"])],
            ..FirewallConfig::default()
        }
    }

    #[test]
    fn default_config_denies_everything() {
        let fw = Firewall::new(FirewallConfig::default());
        assert!(fw.filter_query(&alice(), "search").is_err());
    }

    #[test]
    fn rate_limit_denies_after_quota() {
        let fw = Firewall::new(FirewallConfig {
            rate_limit_per_minute: 3,
            ..open_config()
        });
        for _ in 0..3 {
            assert!(fw.filter_query(&alice(), "search").is_ok());
        }
        assert_eq!(
            fw.filter_query(&alice(), "search"),
            Err(PolicyDenied::RateLimited)
        );
        let bob = Did::new("did:key:bob").unwrap();
        assert!(fw.filter_query(&bob, "search").is_ok());
    }

    #[test]
    fn replenished_peers_are_pruned_from_limiter() {
        // One cell per millisecond: a single call replenishes almost at once.
        let fast = Firewall::new(FirewallConfig {
            rate_limit_per_minute: 60_000,
            ..open_config()
        });
        fast.filter_query(&alice(), "search").unwrap();
        fast.filter_query(&Did::new("did:key:bob").unwrap(), "search").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(25));
        assert_eq!(fast.retain_recent_rate_limits(), 0);

        // One cell per 20 s: the peer stays tracked.
        let slow = Firewall::new(FirewallConfig {
            rate_limit_per_minute: 3,
            ..open_config()
        });
        slow.filter_query(&alice(), "search").unwrap();
        assert_eq!(slow.retain_recent_rate_limits(), 1);

        assert_eq!(Firewall::new(open_config()).retain_recent_rate_limits(), 0);
    }

    #[test]
    fn runtime_rule_changes() {
        let fw = Firewall::new(FirewallConfig::default());
        fw.add_rule(AclRule::allow("did:key:alice", &["search"]));
        assert!(fw.filter_query(&alice(), "search").is_ok());
        fw.add_rule(AclRule::deny("did:key:alice", &["search"]));
        assert!(fw.filter_query(&alice(), "search").is_err());
        assert_eq!(fw.remove_rules_for_peer("did:key:alice"), 2);
        assert!(fw.rules().is_empty());
    }

    #[test]
    fn sanitize_uses_configured_keys() {
        let fw = Firewall::new(FirewallConfig {
            redact_keys: vec!["internal".into()],
            ..open_config()
        });
        let out = fw.sanitize_response(json!({"internal_id": 1, "password": "x"}));
        assert_eq!(out, json!({"password": "x"}));
    }

    #[test]
    fn attest_without_attester_is_unavailable() {
        let fw = Firewall::new(open_config());
        assert!(matches!(
            fw.attest_response(&[0u8; 32], &[1u8; 32]),
            Err(AttestationError::Unavailable)
        ));
    }

    #[test]
    fn attest_with_attester_produces_verifiable_bundle() {
        let attester = Arc::new(ResponseAttester::setup(SecretKey::from_bytes([9u8; 32])).unwrap());
        let fw = Firewall::new(open_config()).with_attester(Arc::clone(&attester));
        let bytes = fw.attest_response(&[5u8; 32], &[6u8; 32]).unwrap();
        let bundle = AttestationBundle::from_bytes(&bytes).unwrap();
        let expected = attester.agent_did_hash(&[6u8; 32]).unwrap();
        assert!(attester.verifier().verify_for_agent(&bundle, &expected).unwrap());
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: FirewallConfig =
            serde_json::from_str(r#"{"rate_limit_per_minute": 5}"#).unwrap();
        assert_eq!(cfg.rate_limit_per_minute, 5);
        assert!(cfg.rules.is_empty());
        assert_eq!(cfg.redact_keys.len(), DEFAULT_REDACT_KEYS.len());
    }
}
