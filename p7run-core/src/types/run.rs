use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Extensions, ParameterSlot, ResultSlot};

/// Server-owned run state.
///
/// States the client does not act on are kept verbatim in `Other` so polling
/// can continue through them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunState {
    Configuration,
    Running,
    Finished,
    Failed,
    Interrupted,
    Other(String),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Interrupted)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Configuration => "CONFIGURATION",
            Self::Running => "RUNNING",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
            Self::Interrupted => "INTERRUPTED",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RunState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CONFIGURATION" => Self::Configuration,
            "RUNNING" => Self::Running,
            "FINISHED" => Self::Finished,
            "FAILED" => Self::Failed,
            "INTERRUPTED" => Self::Interrupted,
            _ => Self::Other(s),
        }
    }
}

impl From<RunState> for String {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of a run resource.
///
/// The server is the system of record; a snapshot is re-fetched before each use
/// and never mutated in place. Unknown fields round-trip through `extensions` so
/// the whole document can be sent back as a partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub state: RunState,

    #[serde(default)]
    pub parameters: Vec<ParameterSlot>,

    /// `null` until the run is terminal; sent back as `null` in that case.
    #[serde(default)]
    pub results: Option<Vec<ResultSlot>>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl RunSnapshot {
    /// A new document identical to this one except for its parameters.
    pub fn with_parameters(&self, parameters: Vec<ParameterSlot>) -> Self {
        Self {
            parameters,
            ..self.clone()
        }
    }

    pub fn results(&self) -> &[ResultSlot] {
        self.results.as_deref().unwrap_or(&[])
    }
}
