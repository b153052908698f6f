use std::fmt;
use std::time::Duration;

use p7run_core::CodecError;

use crate::transport::TransportError;

/// The wait loops of a run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    Configuration,
    Running,
    Terminal,
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configuration => "CONFIGURATION state",
            Self::Running => "RUNNING state",
            Self::Terminal => "a terminal state",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Transport(TransportError),
    #[error("timed out after {waited:?} waiting for {phase}")]
    Timeout { phase: WaitPhase, waited: Duration },
    #[error("cancelled")]
    Cancelled,
}

impl From<TransportError> for LifecycleError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Cancelled => Self::Cancelled,
            other => Self::Transport(other),
        }
    }
}
