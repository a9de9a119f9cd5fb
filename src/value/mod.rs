//! Value Module
//!
//! Tagged value type stored by the engine and its text codec.
//!
//! A [`Value`] is any JSON-compatible value except a top-level `null`.
//! Falsy values (`false`, `0`, `""`, `[]`, `{}`) are ordinary values and are
//! never coalesced into absence.

pub mod codec;

use std::collections::BTreeMap;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};

use crate::error::KvError;

pub use codec::{decode, encode, DecodeError};

// == Value ==
/// A storable value.
///
/// Containers hold `Option<Value>` so a nested JSON `null` survives a round
/// trip, while the top level can never be `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Keeps the integer/float distinction of the original number
    Number(Number),
    String(String),
    List(Vec<Option<Value>>),
    Map(BTreeMap<String, Option<Value>>),
}

impl Value {
    /// Short name of the variant, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Converts a JSON element that may be nested `null`.
    fn from_element(json: JsonValue) -> Option<Value> {
        match json {
            JsonValue::Null => None,
            JsonValue::Bool(b) => Some(Value::Bool(b)),
            JsonValue::Number(n) => Some(Value::Number(n)),
            JsonValue::String(s) => Some(Value::String(s)),
            JsonValue::Array(items) => Some(Value::List(
                items.into_iter().map(Value::from_element).collect(),
            )),
            JsonValue::Object(map) => Some(Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_element(v)))
                    .collect(),
            )),
        }
    }

    fn element_to_json(element: Option<Value>) -> JsonValue {
        element.map(JsonValue::from).unwrap_or(JsonValue::Null)
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = KvError;

    fn try_from(json: JsonValue) -> Result<Self, Self::Error> {
        Value::from_element(json)
            .ok_or_else(|| KvError::Validation("value cannot be null".to_string()))
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Number(n) => JsonValue::Number(n),
            Value::String(s) => JsonValue::String(s),
            Value::List(items) => {
                JsonValue::Array(items.into_iter().map(Value::element_to_json).collect())
            }
            Value::Map(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::element_to_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => items.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Value::from_element(json).ok_or_else(|| D::Error::custom("value cannot be null"))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_null_rejected() {
        let result = Value::try_from(JsonValue::Null);
        assert!(matches!(result, Err(KvError::Validation(_))));
    }

    #[test]
    fn test_falsy_values_are_values() {
        for json in [json!(false), json!(0), json!(""), json!([]), json!({})] {
            let value = Value::try_from(json.clone()).unwrap();
            assert_eq!(JsonValue::from(value), json);
        }
    }

    #[test]
    fn test_nested_null_kept() {
        let json = json!({"config": null, "items": [1, null, "x"]});
        let value = Value::try_from(json.clone()).unwrap();

        match &value {
            Value::Map(map) => assert_eq!(map.get("config"), Some(&None)),
            other => panic!("expected map, got {:?}", other),
        }
        assert_eq!(JsonValue::from(value), json);
    }

    #[test]
    fn test_integer_and_float_stay_distinct() {
        let int = Value::try_from(json!(42)).unwrap();
        let float = Value::try_from(json!(42.0)).unwrap();
        assert_ne!(int, float);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::from(true).kind(), "bool");
        assert_eq!(Value::from(7).kind(), "number");
        assert_eq!(Value::from("s").kind(), "string");
        assert_eq!(Value::List(vec![]).kind(), "list");
        assert_eq!(Value::Map(BTreeMap::new()).kind(), "map");
    }

    #[test]
    fn test_deserialize_rejects_null() {
        let result: std::result::Result<Value, _> = serde_json::from_str("null");
        assert!(result.is_err());
        let ok: Value = serde_json::from_str("[null]").unwrap();
        assert_eq!(ok, Value::List(vec![None]));
    }
}
