use thiserror::Error;

use crate::types::SchemaType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("'{slot}' is not defined in the input parameters panel (no pre-allocated container)")]
    UnconfiguredSlot { slot: String },
    #[error("size mismatch for '{slot}': the run expects {expected} entries, got {actual}")]
    SizeMismatch {
        slot: String,
        expected: usize,
        actual: usize,
    },
    #[error("input for '{slot}' must be a {} value", expected_shape(.expected))]
    InputShape { slot: String, expected: SchemaType },
    #[error("slot '{slot}' carries no schema tag")]
    MissingSchema { slot: String },
    #[error("slot '{slot}' has unsupported schema type '{tag}'")]
    UnsupportedSchema { slot: String, tag: String },
    #[error("malformed result '{slot}': {reason}")]
    MalformedResult { slot: String, reason: String },
}

impl CodecError {
    pub fn malformed_result(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResult {
            slot: slot.into(),
            reason: reason.into(),
        }
    }

    /// Name of the parameter or output slot the error is about.
    pub fn slot(&self) -> &str {
        match self {
            Self::UnconfiguredSlot { slot }
            | Self::SizeMismatch { slot, .. }
            | Self::InputShape { slot, .. }
            | Self::MissingSchema { slot }
            | Self::UnsupportedSchema { slot, .. }
            | Self::MalformedResult { slot, .. } => slot,
        }
    }
}

fn expected_shape(schema: &SchemaType) -> &'static str {
    match schema {
        SchemaType::Scalar => "scalar",
        SchemaType::List => "sequence",
        SchemaType::Dictionary => "mapping",
    }
}
