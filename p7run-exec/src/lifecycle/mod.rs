mod config;
mod controller;
mod error;
pub mod events;
mod report;

pub use config::LifecycleConfig;
pub use controller::RunController;
pub use error::{LifecycleError, WaitPhase};
pub use events::{CompositeEventSink, Event, EventSink, NoOpEventSink, TracingEventSink};
pub use report::{RunOutcome, RunReport, RunRequest};
