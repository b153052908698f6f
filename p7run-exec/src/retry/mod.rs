mod config;
mod decision;
mod headers;

pub use config::{Jitter, RetryConfig};
pub use decision::{decide_retry, RetryDecision, RetryReason};
pub use headers::parse_retry_after;
