//! Recursive redaction of sensitive object values
//!
//! Objects are walked at every depth. A scalar under a sensitive key is
//! replaced according to the [`RedactionMode`]. Arrays are left untouched and
//! never descended into, and an object under a sensitive key is descended into
//! rather than replaced.

use crate::error::UnhashableValue;
use crate::keys::SensitiveKeySet;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Placeholder written over masked values.
pub const MASK_PLACEHOLDER: &str = "***REDACTED***";

/// Replacement strategy for sensitive values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedactionMode {
    /// Replace with [`MASK_PLACEHOLDER`]
    #[default]
    Mask,
    /// Replace a string with the hex SHA-256 digest of its UTF-8 bytes
    Hash,
}

impl RedactionMode {
    /// Lower-case name used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            RedactionMode::Mask => "mask",
            RedactionMode::Hash => "hash",
        }
    }
}

/// A transformed element and the number of values replaced in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Redacted {
    /// Element after redaction
    pub value: Value,
    /// Count of sensitive values that were replaced
    pub replaced: usize,
}

/// Applies one key set and mode to every element of a run.
#[derive(Debug, Clone)]
pub struct Redactor {
    keys: SensitiveKeySet,
    mode: RedactionMode,
}

impl Redactor {
    /// Create a redactor for the given keys and mode.
    pub fn new(keys: SensitiveKeySet, mode: RedactionMode) -> Self {
        Self { keys, mode }
    }

    /// Sensitive keys this redactor matches.
    pub fn keys(&self) -> &SensitiveKeySet {
        &self.keys
    }

    /// Replacement strategy in use.
    pub fn mode(&self) -> RedactionMode {
        self.mode
    }

    /// Redact an element, taking ownership and returning the transformed value.
    ///
    /// Only object-rooted elements are changed; arrays and scalars at the root
    /// pass through as-is.
    pub fn redact(&self, mut value: Value) -> Result<Redacted, UnhashableValue> {
        let replaced = match &mut value {
            Value::Object(map) => self.redact_object(map)?,
            _ => 0,
        };
        Ok(Redacted { value, replaced })
    }

    fn redact_object(&self, map: &mut Map<String, Value>) -> Result<usize, UnhashableValue> {
        let mut replaced = 0;
        for (key, value) in map.iter_mut() {
            match value {
                Value::Object(inner) => replaced += self.redact_object(inner)?,
                // Arrays are never descended; only hashing rejects them.
                Value::Array(_)
                    if self.mode == RedactionMode::Hash && self.keys.contains(key) =>
                {
                    return Err(UnhashableValue {
                        key: key.to_string(),
                        found: "array",
                    });
                }
                Value::Array(_) => {}
                _ if self.keys.contains(key) => {
                    *value = self.replacement(key, value)?;
                    replaced += 1;
                }
                _ => {}
            }
        }
        Ok(replaced)
    }

    fn replacement(&self, key: &str, value: &Value) -> Result<Value, UnhashableValue> {
        match self.mode {
            RedactionMode::Mask => Ok(Value::String(MASK_PLACEHOLDER.to_string())),
            RedactionMode::Hash => match value {
                Value::String(text) => Ok(Value::String(sha256_hex(text))),
                other => Err(UnhashableValue {
                    key: key.to_string(),
                    found: type_name(other),
                }),
            },
        }
    }
}

/// Hex-encoded SHA-256 digest of `text`'s UTF-8 bytes.
pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Get a human-readable type name
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
