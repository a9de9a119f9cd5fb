//! Value Codec
//!
//! Converts a [`Value`] to the text stored in the durable table and back.
//! The encoded form is compact JSON with map keys in sorted order, so the
//! same value always encodes to the same text.

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::error::{KvError, Result};
use crate::value::Value;

// == Decode Error ==
/// Stored text that does not decode to a [`Value`].
///
/// Carries no key; the caller attaches it when converting to
/// [`KvError::Corruption`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct DecodeError(String);

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

// == Encode ==
/// Encodes a value into its durable text form.
pub fn encode(value: &Value) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| KvError::Validation(format!("value cannot be encoded: {}", e)))
}

// == Decode ==
/// Decodes stored text back into a value.
pub fn decode(text: &str) -> std::result::Result<Value, DecodeError> {
    let json: JsonValue =
        serde_json::from_str(text).map_err(|e| DecodeError(format!("invalid JSON: {}", e)))?;

    Value::try_from(json).map_err(|_| DecodeError("stored value is null".to_string()))
}
