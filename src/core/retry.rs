//! Retry with exponential backoff and jitter
//!
//! One [`RetryPolicy`] is shared by every call site that needs a retry
//! envelope. Callers supply the operation and a predicate deciding which
//! errors are worth another attempt.

use crate::config::RetryConfig;
use crate::log_retry_attempt;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Attempt-bounded exponential backoff policy
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Delay before the retry following the zero-based `attempt`, without jitter
    pub fn capped_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Jittered delay: `capped_delay(attempt) * uniform(0.5, 1.5)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.5..=1.5);
        self.capped_delay(attempt).mul_f64(jitter)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt bound is reached
    ///
    /// The operation receives the zero-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by the operation.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        operation: &str,
        is_retryable: P,
        mut f: F,
    ) -> std::result::Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;

        loop {
            match f(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let last_attempt = attempt + 1 >= self.max_attempts;
                    if last_attempt || !is_retryable(&e) {
                        if last_attempt && is_retryable(&e) {
                            tracing::error!(
                                operation,
                                attempts = attempt + 1,
                                error = %e,
                                "Giving up after exhausting retries"
                            );
                        }
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    log_retry_attempt!(
                        operation,
                        attempt + 1,
                        self.max_attempts,
                        delay.as_millis() as u64,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
