//! Request DTOs for the command envelope
//!
//! An envelope is a JSON object whose `command` field selects the operation:
//! `{"command": "set", "key": "k", "value": 1, "ttl_seconds": 60}`.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{KvError, Result};

/// Command names accepted in the envelope.
pub const COMMANDS: [&str; 4] = ["set", "get", "delete", "delete_all"];

// == Command ==
/// A parsed command envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Set(SetRequest),
    Get(KeyRequest),
    Delete(KeyRequest),
    DeleteAll,
}

impl Command {
    /// Parses an untyped envelope.
    ///
    /// Fails with [`KvError::Validation`] when `command` is missing or
    /// unknown, or when a field has the wrong type.
    pub fn from_envelope(envelope: JsonValue) -> Result<Self> {
        match envelope.get("command").and_then(JsonValue::as_str) {
            None => Err(KvError::Validation("'command' is required".to_string())),
            Some(name) if !COMMANDS.contains(&name) => {
                Err(KvError::Validation(format!("Unknown command: {}", name)))
            }
            Some(_) => serde_json::from_value(envelope)
                .map_err(|e| KvError::Validation(e.to_string())),
        }
    }
}

// == Set ==
/// Fields of the `set` command.
///
/// Everything is optional at the wire level so a missing field produces a
/// validation error instead of a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub key: Option<String>,
    /// A JSON `null` deserializes to None and is rejected like a missing value
    #[serde(default)]
    pub value: Option<JsonValue>,
    #[serde(default)]
    pub ttl_seconds: Option<TtlSeconds>,
}

impl SetRequest {
    /// Validates the request and returns key, value and TTL in seconds.
    pub fn into_parts(self) -> Result<(String, JsonValue, Option<f64>)> {
        let (key, value) = match (self.key, self.value) {
            (Some(key), Some(value)) if !key.is_empty() => (key, value),
            _ => {
                return Err(KvError::Validation(
                    "Both 'key' and 'value' are required for set command".to_string(),
                ))
            }
        };

        let ttl = self.ttl_seconds.map(|ttl| ttl.seconds()).transpose()?;
        Ok((key, value, ttl))
    }
}

/// TTL as sent by callers: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TtlSeconds {
    Number(f64),
    Text(String),
}

impl TtlSeconds {
    pub fn seconds(&self) -> Result<f64> {
        let seconds = match self {
            TtlSeconds::Number(n) => Some(*n),
            TtlSeconds::Text(s) => s.trim().parse::<f64>().ok(),
        };

        seconds
            .filter(|s| s.is_finite())
            .ok_or_else(|| KvError::Validation("ttl_seconds must be a valid number".to_string()))
    }
}

// == Key ==
/// Fields of the `get` and `delete` commands.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyRequest {
    #[serde(default)]
    pub key: Option<String>,
}

impl KeyRequest {
    /// Returns the key, or a validation error naming `command`.
    pub fn into_key(self, command: &str) -> Result<String> {
        self.key.filter(|k| !k.is_empty()).ok_or_else(|| {
            KvError::Validation(format!("'key' is required for {} command", command))
        })
    }
}
