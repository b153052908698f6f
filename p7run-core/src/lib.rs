#![forbid(unsafe_code)]

//! Run document model and the schema-typed value codecs for pSeven workflow runs.
//!
//! Nothing in this crate performs I/O; the HTTP side lives in `p7run-exec`.

pub mod codec;
pub mod error;
pub mod types;

pub use crate::codec::{decode_output, decode_results, encode_parameters, Inputs, OutputValue, Outputs};
pub use crate::error::CodecError;
pub use crate::types::{
    find_workflow, CreatedRun, Extensions, ParameterSlot, ResultSlot, RunSnapshot, RunState,
    SchemaRef, SchemaType, WorkflowEntry,
};
