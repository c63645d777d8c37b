//! Defensive field access for device payloads
//!
//! The gate firmware is not strict about types, so every field is type-checked
//! and replaced with a default on mismatch instead of failing the whole payload.

use serde_json::Value;

/// String field, or `default` when missing or not a string
pub fn str_field(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}

/// First of `keys` holding a non-empty string
pub fn str_field_any(value: &Value, keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|key| match value.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_else(|| default.to_string())
}

/// Optional string field; `null` and wrong types become `None`
pub fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Identifier that may arrive as a number or a string
pub fn id_field(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

/// Non-negative integer field, or `default`
pub fn u64_field(value: &Value, key: &str, default: u64) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(default)
}

/// Map every element of an array payload; anything else becomes an empty list
pub fn array_of<T>(payload: &Value, item: impl Fn(&Value) -> T) -> Vec<T> {
    match payload.as_array() {
        Some(items) => items.iter().map(item).collect(),
        None => {
            tracing::error!("Invalid payload format: expected an array");
            Vec::new()
        }
    }
}
