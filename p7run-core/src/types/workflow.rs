use serde::{Deserialize, Serialize};

use crate::types::Extensions;

/// A record of the workflow listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEntry {
    pub id: String,
    pub url: String,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

/// Response body of the run creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedRun {
    pub url: String,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

pub fn find_workflow<'a>(entries: &'a [WorkflowEntry], id: &str) -> Option<&'a WorkflowEntry> {
    entries.iter().find(|w| w.id == id)
}
