use std::collections::BTreeSet;
use std::time::Duration;

/// Backoff policy for requests that must survive transient failures.
///
/// Defaults: exponential from 1 s doubling up to 10 s per wait, giving up once
/// 600 s have passed since the first attempt, no jitter.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub retry_statuses: BTreeSet<u16>,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    pub max_elapsed: Duration,
    pub max_attempts: Option<usize>,
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_statuses: [408u16, 429, 500, 502, 503, 504].into_iter().collect(),
            base_delay: Duration::from_secs(1),
            factor: 2.0,
            max_delay: Duration::from_secs(10),
            max_elapsed: Duration::from_secs(600),
            max_attempts: None,
            jitter: Jitter::None,
        }
    }
}

impl RetryConfig {
    /// Single attempt, never retried.
    pub fn disabled() -> Self {
        Self {
            max_attempts: Some(1),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    None,
    /// Uniform in `[0, computed delay]`.
    Full,
}

impl std::str::FromStr for Jitter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown jitter mode '{other}' (expected none|full)")),
        }
    }
}
