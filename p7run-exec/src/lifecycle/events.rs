use async_trait::async_trait;
use p7run_core::RunState;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    WorkflowResolved {
        workflow_id: String,
        url: String,
    },
    RunCreated {
        run_url: String,
    },
    StateChanged {
        run_url: String,
        state: RunState,
    },
    Configured {
        run_url: String,
        parameters: usize,
    },
    UploadFinished {
        run_url: String,
        item: String,
        succeeded: bool,
    },
    RunStarted {
        run_url: String,
    },
    RunFinished {
        run_url: String,
        state: RunState,
    },
    ReportDownloaded {
        run_url: String,
        path: String,
        succeeded: bool,
    },
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}

/// Logs every event at `info`.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match event {
            Event::WorkflowResolved { workflow_id, url } => {
                info!(%workflow_id, %url, "workflow resolved")
            }
            Event::RunCreated { run_url } => info!(%run_url, "run created"),
            Event::StateChanged { run_url, state } => info!(%run_url, %state, "run state"),
            Event::Configured {
                run_url,
                parameters,
            } => info!(%run_url, parameters, "run configured"),
            Event::UploadFinished {
                run_url,
                item,
                succeeded,
            } => info!(%run_url, %item, succeeded, "upload finished"),
            Event::RunStarted { run_url } => info!(%run_url, "run started"),
            Event::RunFinished { run_url, state } => info!(%run_url, %state, "run finished"),
            Event::ReportDownloaded {
                run_url,
                path,
                succeeded,
            } => info!(%run_url, %path, succeeded, "report downloaded"),
        }
    }
}

#[derive(Default)]
pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}
