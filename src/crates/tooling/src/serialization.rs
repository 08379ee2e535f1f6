//! Stable JSON serialization and fingerprinting
//!
//! JSON objects compare equal regardless of key order, but their string
//! renderings do not. These helpers normalize to sorted-key form so the same
//! logical value always produces the same string and the same fingerprint —
//! the property confirmation tokens and cache keys depend on.

use crate::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Render a JSON value with all object keys sorted.
///
/// # Example
///
/// ```rust
/// use tooling::serialization::stable_json;
/// use serde_json::json;
///
/// let a = stable_json(&json!({"b": 2, "a": 1})).unwrap();
/// let b = stable_json(&json!({"a": 1, "b": 2})).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a, r#"{"a":1,"b":2}"#);
/// ```
pub fn stable_json(value: &Value) -> Result<String> {
    serde_json::to_string(&normalize(value.clone())).map_err(Into::into)
}

/// Serialize any value to its stable JSON rendering.
pub fn to_stable_json<T: Serialize>(value: &T) -> Result<String> {
    stable_json(&serde_json::to_value(value)?)
}

/// Deterministic 64-bit fingerprint of a JSON value.
///
/// Key order does not affect the result. Suitable for opaque tokens and
/// cache keys, not for cryptographic purposes.
pub fn fingerprint(value: &Value) -> u64 {
    let rendered = stable_json(value).unwrap_or_else(|_| value.to_string());
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    rendered.hash(&mut hasher);
    hasher.finish()
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, normalize(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}
