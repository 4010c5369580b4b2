use serde_json::{Map, Value};
use thiserror::Error;

/// Size bounds applied while sanitizing a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeLimits {
    /// Strings longer than this (in characters, after escaping) are truncated.
    pub max_string_len: usize,
    /// Arrays longer than this are rejected.
    pub max_array_len: usize,
    /// Objects with more keys than this are rejected.
    pub max_object_keys: usize,
    /// Object keys are cut to this many characters.
    pub max_key_len: usize,
}

impl Default for SanitizeLimits {
    fn default() -> Self {
        Self {
            max_string_len: 10_000,
            max_array_len: 1_000,
            max_object_keys: 100,
            max_key_len: 100,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("Array too large: {len} elements (max {max})")]
    ArrayTooLarge { len: usize, max: usize },

    #[error("Object too large: {len} keys (max {max})")]
    ObjectTooLarge { len: usize, max: usize },
}

/// Sanitize a JSON payload with the default limits.
pub fn sanitize(value: &Value) -> Result<Value, SanitizeError> {
    sanitize_with(value, &SanitizeLimits::default())
}

/// Recursively sanitize a JSON payload.
///
/// Strings are HTML-escaped, trimmed and truncated. Object keys are reduced to
/// ASCII word characters and `-`; keys left empty are dropped. Oversized arrays
/// and objects are rejected rather than truncated. Everything else is returned
/// unchanged.
pub fn sanitize_with(value: &Value, limits: &SanitizeLimits) -> Result<Value, SanitizeError> {
    match value {
        Value::String(s) => Ok(Value::String(sanitize_string(s, limits.max_string_len))),
        Value::Array(items) => {
            if items.len() > limits.max_array_len {
                return Err(SanitizeError::ArrayTooLarge {
                    len: items.len(),
                    max: limits.max_array_len,
                });
            }
            items
                .iter()
                .map(|item| sanitize_with(item, limits))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Value::Object(fields) => {
            if fields.len() > limits.max_object_keys {
                return Err(SanitizeError::ObjectTooLarge {
                    len: fields.len(),
                    max: limits.max_object_keys,
                });
            }
            let mut out = Map::with_capacity(fields.len());
            for (key, field) in fields {
                let key = sanitize_key(key, limits.max_key_len);
                if key.is_empty() {
                    continue;
                }
                out.insert(key, sanitize_with(field, limits)?);
            }
            Ok(Value::Object(out))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
    }
}

fn sanitize_string(s: &str, max_len: usize) -> String {
    let escaped = escape_html(s);
    let trimmed = escaped.trim();
    match trimmed.char_indices().nth(max_len) {
        Some((cut, _)) => drop_partial_entity(&trimmed[..cut]).to_string(),
        None => trimmed.to_string(),
    }
}

/// Every `&` in escaped text opens an entity; cut before one left unterminated.
fn drop_partial_entity(s: &str) -> &str {
    match s.rfind('&') {
        Some(amp) if !s[amp..].contains(';') => &s[..amp],
        _ => s,
    }
}

fn sanitize_key(key: &str, max_len: usize) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(max_len)
        .collect()
}

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}
