use std::sync::Arc;
use std::time::Duration;

use p7run_core::{
    decode_results, encode_parameters, find_workflow, CreatedRun, Inputs, RunSnapshot, RunState,
    WorkflowEntry,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::download::download_reports;
use crate::lifecycle::events::{Event, EventSink, NoOpEventSink};
use crate::lifecycle::{LifecycleConfig, LifecycleError, RunOutcome, RunReport, RunRequest, WaitPhase};
use crate::transport::{child_url, ApiClient};
use crate::upload::{upload_directories, upload_files};

/// Drives one run at a time from creation to a terminal state.
///
/// Step order is fixed: configure, then uploads, then start, then the RUNNING
/// wait. The controller holds no per-run state, so several runs may be driven
/// concurrently from separate tasks.
pub struct RunController {
    client: ApiClient,
    config: LifecycleConfig,
    events: Arc<dyn EventSink>,
}

impl RunController {
    pub fn new(client: ApiClient, config: LifecycleConfig) -> Self {
        Self {
            client,
            config,
            events: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list_workflows(&self) -> Result<Vec<WorkflowEntry>, LifecycleError> {
        let url = self.client.workflows_url()?;
        Ok(self.client.get_json(&url).await?)
    }

    pub async fn resolve_workflow(&self, workflow_id: &str) -> Result<WorkflowEntry, LifecycleError> {
        debug!(%workflow_id, "resolving workflow");
        let entries = self.list_workflows().await?;
        let workflow = find_workflow(&entries, workflow_id)
            .cloned()
            .ok_or_else(|| LifecycleError::WorkflowNotFound(workflow_id.to_string()))?;
        self.events
            .emit(Event::WorkflowResolved {
                workflow_id: workflow.id.clone(),
                url: workflow.url.clone(),
            })
            .await;
        Ok(workflow)
    }

    /// Create a run of `workflow`; returns the run handle.
    pub async fn create_run(&self, workflow: &WorkflowEntry) -> Result<Url, LifecycleError> {
        let runs_url = child_url(&self.client.resolve(&workflow.url)?, "runs/")?;
        let body = self.client.post_json::<()>(&runs_url, None).await?;
        let created: CreatedRun = serde_json::from_value(body).map_err(|source| {
            crate::transport::TransportError::Decode {
                url: runs_url.to_string(),
                source,
            }
        })?;
        let run_url = self.client.resolve(&created.url)?;
        self.events
            .emit(Event::RunCreated {
                run_url: run_url.to_string(),
            })
            .await;
        Ok(run_url)
    }

    pub async fn fetch_run(&self, run_url: &Url) -> Result<RunSnapshot, LifecycleError> {
        Ok(self.client.get_json(run_url).await?)
    }

    /// Fetch the run, write `inputs` into its parameters and send the whole document back.
    pub async fn configure(&self, run_url: &Url, inputs: &Inputs) -> Result<RunSnapshot, LifecycleError> {
        let current = self.fetch_run(run_url).await?;
        let configured = current.with_parameters(encode_parameters(&current.parameters, inputs)?);
        self.client.patch_json(run_url, &configured).await?;
        self.events
            .emit(Event::Configured {
                run_url: run_url.to_string(),
                parameters: inputs.len(),
            })
            .await;
        Ok(configured)
    }

    pub async fn start(&self, run_url: &Url) -> Result<(), LifecycleError> {
        let action = child_url(run_url, "run/")?;
        self.client.post_json::<()>(&action, None).await?;
        self.events
            .emit(Event::RunStarted {
                run_url: run_url.to_string(),
            })
            .await;
        Ok(())
    }

    /// Full protocol for one invocation.
    pub async fn run(&self, request: &RunRequest, cancel: &CancellationToken) -> Result<RunReport, LifecycleError> {
        let workflow = self.resolve_workflow(&request.workflow_id).await?;
        let run_url = self.create_run(&workflow).await?;
        info!(%run_url, "run created, waiting for CONFIGURATION");

        self.wait_for(&run_url, WaitPhase::Configuration, cancel, |s| {
            *s == RunState::Configuration
        })
        .await?;

        self.configure(&run_url, &request.inputs).await?;

        let mut uploads = upload_files(&self.client, &run_url, &request.upload_files).await;
        uploads.extend(upload_directories(&self.client, &run_url, &request.upload_directories).await);
        for outcome in &uploads {
            self.events
                .emit(Event::UploadFinished {
                    run_url: run_url.to_string(),
                    item: outcome.item.to_string(),
                    succeeded: outcome.succeeded(),
                })
                .await;
        }

        self.start(&run_url).await?;

        // A short run may already be past RUNNING when first observed.
        let observed = self
            .wait_for(&run_url, WaitPhase::Running, cancel, |s| {
                *s == RunState::Running || s.is_terminal()
            })
            .await?;
        let terminal = if observed.state.is_terminal() {
            observed
        } else {
            self.wait_for(&run_url, WaitPhase::Terminal, cancel, RunState::is_terminal)
                .await?
        };

        let outcome = match terminal.state {
            RunState::Failed => {
                warn!(%run_url, "workflow run failed");
                RunOutcome::Failed
            }
            _ => {
                self.pause(self.config.settle_delay, cancel).await?;
                let settled = self.fetch_run(&run_url).await?;
                let outputs = decode_results(settled.results(), &request.outputs);
                for (name, value) in &outputs {
                    if let Some(e) = value.error() {
                        warn!(%run_url, output = %name, error = %e, "output not decoded");
                    }
                }
                RunOutcome::Completed { outputs }
            }
        };

        let reports = download_reports(&self.client, &run_url, &request.report_files).await;
        for outcome in &reports {
            self.events
                .emit(Event::ReportDownloaded {
                    run_url: run_url.to_string(),
                    path: outcome.path.clone(),
                    succeeded: outcome.result.is_ok(),
                })
                .await;
        }

        self.events
            .emit(Event::RunFinished {
                run_url: run_url.to_string(),
                state: terminal.state.clone(),
            })
            .await;

        Ok(RunReport {
            run_url: run_url.to_string(),
            state: terminal.state,
            outcome,
            uploads,
            reports,
        })
    }

    /// Poll `run_url` until `accept` holds for its state.
    async fn wait_for(
        &self,
        run_url: &Url,
        phase: WaitPhase,
        cancel: &CancellationToken,
        accept: impl Fn(&RunState) -> bool,
    ) -> Result<RunSnapshot, LifecycleError> {
        let (interval, timeout) = match phase {
            WaitPhase::Configuration => (self.config.configuration_poll, self.config.configuration_timeout),
            WaitPhase::Running => (self.config.running_poll, self.config.running_timeout),
            WaitPhase::Terminal => (self.config.terminal_poll, self.config.terminal_timeout),
        };
        let started = Instant::now();
        let mut last_state: Option<RunState> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(LifecycleError::Cancelled);
            }

            let snapshot = self.fetch_run(run_url).await?;
            debug!(%run_url, state = %snapshot.state, "polled run");
            if last_state.as_ref() != Some(&snapshot.state) {
                self.events
                    .emit(Event::StateChanged {
                        run_url: run_url.to_string(),
                        state: snapshot.state.clone(),
                    })
                    .await;
                last_state = Some(snapshot.state.clone());
            }

            if accept(&snapshot.state) {
                return Ok(snapshot);
            }
            if let Some(limit) = timeout {
                let waited = started.elapsed();
                if waited >= limit {
                    return Err(LifecycleError::Timeout { phase, waited });
                }
            }

            self.pause(interval, cancel).await?;
        }
    }

    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> Result<(), LifecycleError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(LifecycleError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
