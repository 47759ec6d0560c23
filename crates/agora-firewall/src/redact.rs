//! # Response Redaction
//!
//! Removes object entries whose key contains a sensitive fragment
//! (case-insensitive), at every depth of the result. Redaction only ever
//! deletes entries, so applying it twice is the same as applying it once.

use serde_json::{Map, Value};

/// Key fragments removed when no explicit list is configured.
pub const DEFAULT_REDACT_KEYS: &[&str] = &[
    "password",
    "secret",
    "private_key",
    "api_key",
    "access_token",
    "credential",
];

/// Deletes object entries whose key contains any configured fragment.
#[derive(Debug, Clone)]
pub struct Redactor {
    fragments: Vec<String>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(DEFAULT_REDACT_KEYS.iter().copied())
    }
}

impl Redactor {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(|f| f.as_ref().to_ascii_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }

    fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.fragments.iter().any(|f| key.contains(f.as_str()))
    }

    pub fn redact(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut kept = Map::new();
                for (k, v) in map {
                    if !self.is_sensitive(&k) {
                        kept.insert(k, self.redact(v));
                    }
                }
                Value::Object(kept)
            }
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.redact(v)).collect()),
            other => other,
        }
    }
}
