use p7run_core::{Inputs, Outputs, RunState};

use crate::download::DownloadOutcome;
use crate::upload::{UploadFile, UploadOutcome};

/// Everything one invocation needs to drive a run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub workflow_id: String,
    pub inputs: Inputs,
    /// Output names to decode from the finished run.
    pub outputs: Vec<String>,
    pub upload_files: Vec<UploadFile>,
    pub upload_directories: Vec<String>,
    /// Paths relative to the run directory, fetched once the run is terminal.
    pub report_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// FINISHED or INTERRUPTED; results were decoded.
    Completed { outputs: Outputs },
    /// FAILED; no results are read.
    Failed,
}

#[derive(Debug)]
pub struct RunReport {
    pub run_url: String,
    pub state: RunState,
    pub outcome: RunOutcome,
    pub uploads: Vec<UploadOutcome>,
    pub reports: Vec<DownloadOutcome>,
}

impl RunReport {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Failed)
    }

    /// Requested outputs whose result slot could not be decoded.
    pub fn malformed_outputs(&self) -> Vec<&str> {
        match &self.outcome {
            RunOutcome::Completed { outputs } => outputs
                .iter()
                .filter(|(_, v)| v.error().is_some())
                .map(|(name, _)| name.as_str())
                .collect(),
            RunOutcome::Failed => Vec::new(),
        }
    }
}
