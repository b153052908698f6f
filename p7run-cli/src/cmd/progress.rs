use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use p7run_exec::lifecycle::{Event, EventSink};

/// One-line run status on stderr: current state and upload counts.
pub struct ProgressEventSink {
    total_uploads: usize,
    uploaded: AtomicUsize,
    upload_failures: AtomicUsize,
    state: Mutex<String>,
}

impl ProgressEventSink {
    pub fn new(total_uploads: usize) -> Self {
        Self {
            total_uploads,
            uploaded: AtomicUsize::new(0),
            upload_failures: AtomicUsize::new(0),
            state: Mutex::new("PENDING".to_string()),
        }
    }

    fn render(&self) -> String {
        let state = self
            .state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        let uploaded = self.uploaded.load(Ordering::Relaxed);
        let failed = self.upload_failures.load(Ordering::Relaxed);
        if self.total_uploads == 0 {
            return format!("Run: {state}");
        }
        format!(
            "Run: {state} | uploads [{}/{}] (✗{failed})",
            uploaded + failed,
            self.total_uploads
        )
    }

    fn set_state(&self, state: String) {
        if let Ok(mut s) = self.state.lock() {
            *s = state;
        }
    }
}

#[async_trait]
impl EventSink for ProgressEventSink {
    async fn emit(&self, event: Event) {
        match event {
            Event::StateChanged { state, .. } => {
                self.set_state(state.to_string());
                eprint!("\r{}", self.render());
            }
            Event::UploadFinished { succeeded, .. } => {
                let counter = if succeeded {
                    &self.uploaded
                } else {
                    &self.upload_failures
                };
                counter.fetch_add(1, Ordering::Relaxed);
                eprint!("\r{}", self.render());
            }
            Event::RunFinished { state, .. } => {
                self.set_state(state.to_string());
                eprintln!("\r{}", self.render());
            }
            _ => {}
        }
    }
}
