use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CodecError;
use crate::types::{Extensions, SchemaType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "@type")]
    pub type_tag: String,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

/// One entry of a run's `parameters` array.
///
/// `value` is kept as raw JSON: its nesting depends on the schema type and the
/// containers inside it are allocated by the server, not by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSlot {
    pub name: String,

    #[serde(default)]
    pub schemas: Vec<SchemaRef>,

    #[serde(default)]
    pub value: Value,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl ParameterSlot {
    /// Schema type of the slot, taken from the first schema entry.
    pub fn schema_type(&self) -> Result<SchemaType, CodecError> {
        let tag = self
            .schemas
            .first()
            .map(|s| s.type_tag.as_str())
            .ok_or_else(|| CodecError::MissingSchema {
                slot: self.name.clone(),
            })?;
        SchemaType::from_tag(tag).ok_or_else(|| CodecError::UnsupportedSchema {
            slot: self.name.clone(),
            tag: tag.to_string(),
        })
    }
}

/// One entry of a finished run's `results` array (an output port).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSlot {
    pub name: String,

    #[serde(default)]
    pub value: Value,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl ResultSlot {
    /// `value.properties.@schema.@type`, if present.
    pub fn schema_tag(&self) -> Option<&str> {
        self.value
            .pointer("/properties/@schema/@type")
            .and_then(Value::as_str)
    }
}
