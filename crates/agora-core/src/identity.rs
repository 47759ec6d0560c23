//! # Identity Newtypes
//!
//! Every agent on the network is addressed by a W3C Decentralized
//! Identifier. [`Did`] validates `did:<method>:<method-specific-id>` at
//! construction time and again when deserialized, so a malformed identity
//! can never reach the session store or the policy layer.
//!
//! ## Security Invariant
//!
//! Session lookup, ACL matching, and identity hashing all key on the exact
//! DID string. Validation is purely syntactic; no normalization is applied,
//! so two DIDs are the same peer iff their strings are byte-equal.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// W3C Decentralized Identifier (DID).
///
/// Format: `did:<method>:<method-specific-id>` where the method is lowercase
/// alphanumeric and the method-specific id is non-empty.
///
/// Reference: <https://www.w3.org/TR/did-core/#did-syntax>
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Did(String);

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not
    /// match the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !Self::is_well_formed(&s) {
            return Err(ValidationError::InvalidDid(s));
        }
        Ok(Self(s))
    }

    fn is_well_formed(s: &str) -> bool {
        let Some((method, identifier)) = s
            .strip_prefix("did:")
            .and_then(|rest| rest.split_once(':'))
        else {
            return false;
        };
        !method.is_empty()
            && method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            && !identifier.is_empty()
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Did {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
