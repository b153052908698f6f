#![forbid(unsafe_code)]

//! Drives a pSeven workflow run through the REST API: resolve, create, configure,
//! upload, start, poll, decode.

pub mod download;
pub mod lifecycle;
pub mod retry;
pub mod secrets;
pub mod transport;
pub mod upload;

pub use crate::lifecycle::{
    LifecycleConfig, LifecycleError, RunController, RunOutcome, RunReport, RunRequest, WaitPhase,
};
pub use crate::transport::{ApiClient, ClientConfig, ReqwestHttpClient};
