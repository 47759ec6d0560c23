//! # Node Configuration
//!
//! Loaded from YAML, then overridden from the environment:
//!
//! - `AGORA_LISTEN_ADDR`
//! - `AGORA_LOCAL_DID`
//! - `AGORA_SESSION_TTL_SECS`
//! - `AGORA_AGENT_SECRET` (32-byte hex; takes precedence over `agent_secret_path`)
//!
//! Every field has a default, so an empty file is a valid configuration
//! apart from the local DID, which must come from somewhere.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use agora_core::Did;
use agora_crypto::SecretKey;
use agora_firewall::FirewallConfig;
use agora_protocol::DEFAULT_MAX_MESSAGE_BYTES;

pub const ENV_LISTEN_ADDR: &str = "AGORA_LISTEN_ADDR";
pub const ENV_LOCAL_DID: &str = "AGORA_LOCAL_DID";
pub const ENV_SESSION_TTL_SECS: &str = "AGORA_SESSION_TTL_SECS";
pub const ENV_AGENT_SECRET: &str = "AGORA_AGENT_SECRET";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7400";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("local_did is required (set it in the config file or {ENV_LOCAL_DID})")]
    MissingLocalDid,

    #[error("invalid agent secret: {0}")]
    InvalidSecret(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: agora_session::DEFAULT_SESSION_TTL.as_secs(),
            cleanup_interval_secs: agora_session::DEFAULT_CLEANUP_INTERVAL.as_secs(),
        }
    }
}

/// Fields copied into the served agent card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSettings {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            name: "agora-agent".to_string(),
            description: None,
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub local_did: Option<Did>,
    pub listen_addr: String,
    pub session: SessionSettings,
    pub max_message_bytes: usize,
    pub agent_secret_path: Option<PathBuf>,
    pub card: CardSettings,
    pub firewall: FirewallConfig,
    /// Hex secret from the environment. Never read from or written to files.
    #[serde(skip)]
    agent_secret_hex: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("local_did", &self.local_did)
            .field("listen_addr", &self.listen_addr)
            .field("session", &self.session)
            .field("max_message_bytes", &self.max_message_bytes)
            .field("agent_secret_path", &self.agent_secret_path)
            .field(
                "agent_secret",
                &self.agent_secret_hex.as_ref().map(|_| "[REDACTED]"),
            )
            .field("card", &self.card)
            .field("firewall", &self.firewall)
            .finish()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            local_did: None,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            session: SessionSettings::default(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            agent_secret_path: None,
            card: CardSettings::default(),
            firewall: FirewallConfig::default(),
            agent_secret_hex: None,
        }
    }
}

impl NodeConfig {
    /// Load from `path` (or defaults when `None`), then apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            self.listen_addr = addr;
        }
        if let Some(did) = lookup(ENV_LOCAL_DID) {
            self.local_did = Some(Did::new(did).map_err(|e| ConfigError::InvalidEnv {
                var: ENV_LOCAL_DID,
                reason: e.to_string(),
            })?);
        }
        if let Some(ttl) = lookup(ENV_SESSION_TTL_SECS) {
            self.session.ttl_secs = ttl.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: ENV_SESSION_TTL_SECS,
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(secret) = lookup(ENV_AGENT_SECRET) {
            self.agent_secret_hex = Some(Zeroizing::new(secret));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.ttl_secs == 0 {
            return Err(ConfigError::Invalid("session.ttl_secs must be positive".into()));
        }
        if self.session.cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.cleanup_interval_secs must be positive".into(),
            ));
        }
        if self.max_message_bytes == 0 {
            return Err(ConfigError::Invalid("max_message_bytes must be positive".into()));
        }
        Ok(())
    }

    pub fn require_local_did(&self) -> Result<Did, ConfigError> {
        self.local_did.clone().ok_or(ConfigError::MissingLocalDid)
    }

    /// The agent secret from the environment or `agent_secret_path`, if
    /// either is set. `None` means the node serves unattested responses.
    pub fn agent_secret(&self) -> Result<Option<SecretKey>, ConfigError> {
        if let Some(hex) = &self.agent_secret_hex {
            return parse_secret(hex).map(Some);
        }
        let Some(path) = &self.agent_secret_path else {
            return Ok(None);
        };
        let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            ConfigError::Read {
                path: path.clone(),
                source,
            }
        })?);
        parse_secret(&raw).map(Some)
    }
}

fn parse_secret(hex: &str) -> Result<SecretKey, ConfigError> {
    SecretKey::from_hex(hex.trim()).map_err(|e| ConfigError::InvalidSecret(e.to_string()))
}
