use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use crate::retry::config::{Jitter, RetryConfig};
use crate::retry::headers::parse_retry_after;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { delay: Duration, reason: RetryReason },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    NotRetryable,
    AttemptsExhausted,
    BudgetExhausted,
    NetworkFailure,
    HttpStatus(u16),
    RetryAfterHeader,
}

/// Decide if a failed attempt should be retried and how long to wait.
///
/// - `attempt_no`: 1-based number of the attempt that just failed.
/// - `elapsed`: time since the first attempt started.
/// - `http_status`: status code if the server answered.
/// - `response_headers`: headers if the server answered.
/// - `network_failed`: no response at all (connect error, timeout).
/// - `rand_u64`: RNG for full jitter.
#[allow(clippy::too_many_arguments)]
pub fn decide_retry(
    cfg: &RetryConfig,
    attempt_no: usize,
    elapsed: Duration,
    http_status: Option<u16>,
    response_headers: Option<&BTreeMap<String, String>>,
    network_failed: bool,
    now: SystemTime,
    rand_u64: impl Fn() -> u64,
) -> RetryDecision {
    if let Some(status) = http_status {
        if !cfg.retry_statuses.contains(&status) {
            return RetryDecision::Stop {
                reason: RetryReason::HttpStatus(status),
            };
        }
    } else if !network_failed {
        return RetryDecision::Stop {
            reason: RetryReason::NotRetryable,
        };
    }

    if cfg.max_attempts.is_some_and(|max| attempt_no >= max) {
        return RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted,
        };
    }
    let Some(remaining) = cfg.max_elapsed.checked_sub(elapsed).filter(|r| !r.is_zero()) else {
        return RetryDecision::Stop {
            reason: RetryReason::BudgetExhausted,
        };
    };

    if let Some(h) = response_headers {
        if let Some(delay) = parse_retry_after(h, now) {
            return RetryDecision::RetryAfter {
                delay: delay.min(cfg.max_delay).min(remaining),
                reason: RetryReason::RetryAfterHeader,
            };
        }
    }

    // base * factor^(attempt_no-1), capped.
    let exp = attempt_no.saturating_sub(1) as i32;
    let raw = (cfg.base_delay.as_millis() as f64) * cfg.factor.powi(exp);
    let raw_ms = raw.min(cfg.max_delay.as_millis() as f64).max(0.0) as u64;
    let delay_ms = match cfg.jitter {
        Jitter::None => raw_ms,
        Jitter::Full if raw_ms == 0 => 0,
        Jitter::Full => rand_u64() % (raw_ms + 1),
    };

    RetryDecision::RetryAfter {
        delay: Duration::from_millis(delay_ms).min(remaining),
        reason: http_status
            .map(RetryReason::HttpStatus)
            .unwrap_or(RetryReason::NetworkFailure),
    }
}
