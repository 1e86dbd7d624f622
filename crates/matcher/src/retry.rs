//! Bounded retry with jittered exponential backoff.
//!
//! Only errors that report themselves as retryable are retried. Invalid input
//! and configuration errors are returned on the first attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use index::IndexError;
use semantic::EmbeddingError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::MatchError;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        EmbeddingError::is_retryable(self)
    }
}

impl Retryable for IndexError {
    fn is_retryable(&self) -> bool {
        IndexError::is_retryable(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    #[serde(with = "crate::serde_millis")]
    pub base_delay: Duration,
    #[serde(with = "crate::serde_millis")]
    pub max_delay: Duration,
    /// Add up to 50% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn disabled() -> Self {
        Self::default().with_max_attempts(1)
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_attempts == 0 {
            return Err(MatchError::Configuration(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.base_delay > self.max_delay {
            return Err(MatchError::Configuration(
                "retry.base_delay must not exceed retry.max_delay".into(),
            ));
        }
        Ok(())
    }

    /// Delay before retry number `attempt + 1` (zero based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        let cap = self.max_delay.as_millis() as u64;
        let delay = base.saturating_mul(2_u64.saturating_pow(attempt)).min(cap);

        if self.jitter && delay > 0 {
            let jitter = fastrand::u64(0..=delay / 2);
            Duration::from_millis((delay + jitter).min(cap))
        } else {
            Duration::from_millis(delay)
        }
    }
}

/// Outcome of [`retry_async`].
#[derive(Debug)]
pub struct Retried<T, E> {
    pub result: Result<T, E>,
    /// Attempts made; 1 means the first call settled it.
    pub attempts: u32,
    pub elapsed: Duration,
}

impl<T, E> Retried<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is used up. The closure receives the zero-based attempt.
pub async fn retry_async<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Retried<T, E>
where
    E: Retryable + Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                return Retried {
                    result: Ok(value),
                    attempts: attempt + 1,
                    elapsed: start.elapsed(),
                };
            }
            Err(err) if err.is_retryable() && attempt + 1 < max_attempts => {
                let delay = config.backoff_delay(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                return Retried {
                    result: Err(err),
                    attempts: attempt + 1,
                    elapsed: start.elapsed(),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig::default()
            .with_base_delay(Duration::ZERO)
            .with_jitter(false)
    }

    fn transient() -> IndexError {
        IndexError::Unavailable("connection reset".into())
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let cfg = RetryConfig::default()
            .with_base_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_millis(700))
            .with_jitter(false);
        assert_eq!(cfg.backoff_delay(0), Duration::from_millis(200));
        assert_eq!(cfg.backoff_delay(1), Duration::from_millis(400));
        assert_eq!(cfg.backoff_delay(2), Duration::from_millis(700));
        assert_eq!(cfg.backoff_delay(40), Duration::from_millis(700));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let cfg = RetryConfig::default();
        for _ in 0..100 {
            let d = cfg.backoff_delay(1);
            assert!(d >= Duration::from_millis(400));
            assert!(d <= Duration::from_millis(600));
        }
    }

    #[test]
    fn validate_rejects_zero_attempts_and_inverted_delays() {
        assert!(RetryConfig::default().validate().is_ok());
        assert!(RetryConfig::default().with_max_attempts(0).validate().is_err());
        assert!(RetryConfig::default()
            .with_base_delay(Duration::from_secs(10))
            .validate()
            .is_err());
    }

    #[test]
    fn durations_serialize_as_millis() {
        let json = serde_json::to_value(RetryConfig::default()).unwrap();
        assert_eq!(json["base_delay"], 200);
        assert_eq!(json["max_delay"], 5000);
        let back: RetryConfig = serde_json::from_str(r#"{"max_attempts": 5}"#).unwrap();
        assert_eq!(back.max_attempts, 5);
        assert_eq!(back.base_delay, Duration::from_millis(200));
        let text: RetryConfig =
            serde_json::from_str(r#"{"base_delay": "50ms", "max_delay": "2s"}"#).unwrap();
        assert_eq!(text.base_delay, Duration::from_millis(50));
        assert_eq!(text.max_delay, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let out = retry_async(&fast(), "query", |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(transient()) } else { Ok(n) } }
        })
        .await;
        assert_eq!(out.result.unwrap(), 2);
        assert_eq!(out.attempts, 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let out: Retried<(), _> = retry_async(&fast(), "query", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transient()) }
        })
        .await;
        assert!(out.result.is_err());
        assert_eq!(out.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let out: Retried<(), _> = retry_async(&fast(), "upsert", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(IndexError::missing_collection("profiles")) }
        })
        .await;
        assert_eq!(out.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_input_is_not_retried() {
        let out: Retried<(), _> = retry_async(&fast(), "embed", |_| async {
            Err(EmbeddingError::InvalidInput {
                owner_id: "c-1".into(),
                reason: "empty text".into(),
            })
        })
        .await;
        assert_eq!(out.attempts, 1);
    }
}
