//! Canonical JSON and blake3 hashing for model artifacts
//!
//! Canonical form: object keys sorted recursively, no whitespace. Two
//! artifacts with the same content hash identically regardless of how the
//! exporter ordered their keys.

use crate::errors::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Serialize a value to canonical JSON
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let json_value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&canonicalize(json_value))?)
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

/// blake3 digest of the canonical JSON form
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<[u8; 32]> {
    let json = to_canonical_json(value)?;
    Ok(*blake3::hash(json.as_bytes()).as_bytes())
}

/// Hex-encoded blake3 digest of the canonical JSON form
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String> {
    Ok(hex::encode(canonical_hash(value)?))
}
