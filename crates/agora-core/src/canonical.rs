//! # Canonical Serialization
//!
//! Defines [`CanonicalBytes`], the sole construction path for bytes used in
//! digest computation over structured values.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct
//! `CanonicalBytes` is through [`CanonicalBytes::new()`], which sorts object
//! keys lexicographically at every depth and emits compact separators. A
//! responder and a verifier that hash the same JSON value therefore hash the
//! same bytes regardless of field order on the wire.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by sorted-key, compact JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let sorted = sort_keys(value);
        Ok(Self(serde_json::to_vec(&sorted)?))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Rebuild every object with keys inserted in sorted order.
///
/// Insertion order is what `serde_json` emits when `preserve_order` is
/// enabled anywhere in the dependency graph, so sorting explicitly keeps the
/// output stable under feature unification.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_sorted_at_every_depth() {
        let cb = CanonicalBytes::new(&json!({"b": 1, "a": {"d": [ {"z": 0, "y": 1} ], "c": null}}))
            .unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"a":{"c":null,"d":[{"y":1,"z":0}]},"b":1}"#
        );
    }

    #[test]
    fn field_order_does_not_change_bytes() {
        let a: Value = serde_json::from_str(r#"{"x":1,"y":"two","z":[3]}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"z":[3],"y":"two","x":1}"#).unwrap();
        assert_eq!(CanonicalBytes::new(&a).unwrap(), CanonicalBytes::new(&b).unwrap());
    }

    #[test]
    fn floats_are_preserved() {
        let cb = CanonicalBytes::new(&json!({"score": 0.5})).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"score":0.5}"#);
    }

    #[test]
    fn scalars_serialize_compactly() {
        assert_eq!(CanonicalBytes::new(&"hi").unwrap().as_bytes(), b"\"hi\"");
        assert_eq!(CanonicalBytes::new(&42u32).unwrap().as_bytes(), b"42");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn canonicalization_is_idempotent(keys in proptest::collection::vec("[a-z]{1,6}", 0..8)) {
                let mut map = Map::new();
                for (i, k) in keys.iter().enumerate() {
                    map.insert(k.clone(), Value::from(i as u64));
                }
                let first = CanonicalBytes::new(&Value::Object(map)).unwrap();
                let reparsed: Value = serde_json::from_slice(first.as_bytes()).unwrap();
                let second = CanonicalBytes::new(&reparsed).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}
