mod run;
mod schema;
mod slot;
mod workflow;

pub use run::{RunSnapshot, RunState};
pub use schema::SchemaType;
pub use slot::{ParameterSlot, ResultSlot, SchemaRef};
pub use workflow::{find_workflow, CreatedRun, WorkflowEntry};

/// Fields the client does not interpret but must send back untouched.
pub type Extensions = serde_json::Map<String, serde_json::Value>;
