//! Canonical JSON and artifact fingerprints
//!
//! Object keys are sorted recursively and whitespace is dropped, so two
//! artifacts with the same content always hash to the same fingerprint
//! regardless of how they were written out.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Canonical serialization failed: {0}")]
pub struct CanonicalError(#[from] serde_json::Error);

/// Serialize `value` with sorted keys and no whitespace
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let canonical = canonicalize(serde_json::to_value(value)?);
    Ok(serde_json::to_string(&canonical)?)
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Blake3 digest of the canonical JSON form, hex encoded
pub fn fingerprint_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let json = to_canonical_json(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_sorted_recursively() {
        let value = json!({"trees": [{"weight": 1, "nodes": []}], "bias": 0});
        let canonical = to_canonical_json(&value).unwrap();
        assert_eq!(canonical, r#"{"bias":0,"trees":[{"nodes":[],"weight":1}]}"#);
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let a = json!({"scale": 1000, "bias": 5});
        let b: Value = serde_json::from_str(r#"{"bias": 5, "scale": 1000}"#).unwrap();
        let hash = fingerprint_hex(&a).unwrap();
        assert_eq!(hash, fingerprint_hex(&b).unwrap());
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = json!({"bias": 5});
        let b = json!({"bias": 6});
        assert_ne!(fingerprint_hex(&a).unwrap(), fingerprint_hex(&b).unwrap());
    }
}
