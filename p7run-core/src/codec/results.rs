use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::CodecError;
use crate::types::{ResultSlot, SchemaType};

/// Decoded value of one requested output.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Value(Value),
    /// The run produced no result slot with this name.
    Missing,
    /// The slot exists but could not be decoded; other outputs are unaffected.
    Malformed(CodecError),
}

impl OutputValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing | Self::Malformed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CodecError> {
        match self {
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl Serialize for OutputValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Missing => serializer.serialize_none(),
            Self::Malformed(e) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", &e.to_string())?;
                map.end()
            }
        }
    }
}

pub type Outputs = BTreeMap<String, OutputValue>;

/// Decode every requested output. A slot that fails to decode becomes
/// `Malformed` under its own name; the other names decode normally.
pub fn decode_results<S: AsRef<str>>(results: &[ResultSlot], requested: &[S]) -> Outputs {
    requested
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let value = decode_output(results, name).unwrap_or_else(OutputValue::Malformed);
            (name.to_string(), value)
        })
        .collect()
}

/// Decode a single output by name. An absent name is `Missing`, not an error.
pub fn decode_output(results: &[ResultSlot], name: &str) -> Result<OutputValue, CodecError> {
    match results.iter().find(|r| r.name == name) {
        Some(slot) => decode_slot(slot).map(OutputValue::Value),
        None => Ok(OutputValue::Missing),
    }
}

fn decode_slot(slot: &ResultSlot) -> Result<Value, CodecError> {
    let tag = slot.schema_tag().ok_or_else(|| {
        CodecError::malformed_result(&slot.name, "missing value.properties.@schema.@type")
    })?;
    let schema = SchemaType::from_tag(tag).ok_or_else(|| CodecError::UnsupportedSchema {
        slot: slot.name.clone(),
        tag: tag.to_string(),
    })?;
    let payload = slot
        .value
        .get("value")
        .ok_or_else(|| CodecError::malformed_result(&slot.name, "missing value.value"))?;

    match schema {
        SchemaType::Scalar => Ok(payload.clone()),
        SchemaType::List => {
            let items = payload.as_array().ok_or_else(|| {
                CodecError::malformed_result(&slot.name, "List payload is not an array")
            })?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.get("value").cloned().ok_or_else(|| {
                        CodecError::malformed_result(&slot.name, format!("element {i} has no value"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        SchemaType::Dictionary => {
            let entries = payload.as_array().ok_or_else(|| {
                CodecError::malformed_result(&slot.name, "Dictionary payload is not an array")
            })?;
            let mut map = serde_json::Map::new();
            for (i, entry) in entries.iter().enumerate() {
                let key = entry.get("key").and_then(Value::as_str).ok_or_else(|| {
                    CodecError::malformed_result(&slot.name, format!("entry {i} has no string key"))
                })?;
                let v = entry.pointer("/value/value").ok_or_else(|| {
                    CodecError::malformed_result(&slot.name, format!("entry {i} has no value.value"))
                })?;
                // Duplicate keys: last write wins.
                map.insert(key.to_string(), v.clone());
            }
            Ok(Value::Object(map))
        }
    }
}
