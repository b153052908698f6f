use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use p7run_exec::retry::{decide_retry, parse_retry_after, Jitter, RetryConfig, RetryDecision, RetryReason};

fn decide(cfg: &RetryConfig, attempt: usize, elapsed: u64, status: Option<u16>) -> RetryDecision {
    decide_retry(
        cfg,
        attempt,
        Duration::from_secs(elapsed),
        status,
        None,
        status.is_none(),
        SystemTime::UNIX_EPOCH,
        || 7,
    )
}

#[test]
fn backoff_doubles_and_caps_without_jitter() {
    let cfg = RetryConfig::default();
    let delays: Vec<_> = (1..=6)
        .map(|n| match decide(&cfg, n, 0, Some(503)) {
            RetryDecision::RetryAfter { delay, .. } => delay.as_secs(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);
}

#[test]
fn non_retryable_status_stops() {
    let cfg = RetryConfig::default();
    assert_eq!(
        decide(&cfg, 1, 0, Some(400)),
        RetryDecision::Stop {
            reason: RetryReason::HttpStatus(400)
        }
    );
}

#[test]
fn network_failure_retries_until_budget() {
    let cfg = RetryConfig::default();
    assert!(matches!(
        decide(&cfg, 3, 100, None),
        RetryDecision::RetryAfter {
            reason: RetryReason::NetworkFailure,
            ..
        }
    ));
    assert_eq!(
        decide(&cfg, 50, 600, None),
        RetryDecision::Stop {
            reason: RetryReason::BudgetExhausted
        }
    );
    // the last wait never overshoots the budget
    assert_eq!(
        decide(&cfg, 20, 598, None),
        RetryDecision::RetryAfter {
            delay: Duration::from_secs(2),
            reason: RetryReason::NetworkFailure
        }
    );
}

#[test]
fn attempt_limit_stops() {
    let cfg = RetryConfig {
        max_attempts: Some(2),
        ..Default::default()
    };
    assert_eq!(
        decide(&cfg, 2, 0, Some(502)),
        RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted
        }
    );
}

#[test]
fn full_jitter_uses_rng() {
    let cfg = RetryConfig {
        jitter: Jitter::Full,
        ..Default::default()
    };
    // raw delay 4000 ms, rng 7 -> 7 % 4001
    assert_eq!(
        decide(&cfg, 3, 0, Some(503)),
        RetryDecision::RetryAfter {
            delay: Duration::from_millis(7),
            reason: RetryReason::HttpStatus(503)
        }
    );
    assert_eq!("full".parse::<Jitter>().unwrap(), Jitter::Full);
    assert!("sometimes".parse::<Jitter>().is_err());
}

#[test]
fn retry_after_header_wins_and_is_capped() {
    let cfg = RetryConfig::default();
    let mut headers = BTreeMap::new();
    headers.insert("Retry-After".to_string(), "3".to_string());
    let d = decide_retry(&cfg, 1, Duration::ZERO, Some(429), Some(&headers), false, SystemTime::UNIX_EPOCH, || 0);
    assert_eq!(
        d,
        RetryDecision::RetryAfter {
            delay: Duration::from_secs(3),
            reason: RetryReason::RetryAfterHeader
        }
    );

    headers.insert("Retry-After".to_string(), "120".to_string());
    let d = decide_retry(&cfg, 1, Duration::ZERO, Some(429), Some(&headers), false, SystemTime::UNIX_EPOCH, || 0);
    assert!(matches!(d, RetryDecision::RetryAfter { delay, .. } if delay == Duration::from_secs(10)));
}

#[test]
fn parse_retry_after_http_date() {
    let mut headers = BTreeMap::new();
    let now = SystemTime::now();
    headers.insert(
        "retry-after".to_string(),
        httpdate::fmt_http_date(now + Duration::from_secs(10)),
    );
    let delay = parse_retry_after(&headers, now).unwrap();
    assert!(delay.as_secs() >= 9 && delay.as_secs() <= 10);
    assert!(parse_retry_after(&BTreeMap::new(), now).is_none());
}
