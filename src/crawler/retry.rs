//! Bounded exponential-backoff retry for individual remote calls
//!
//! The wait after the n-th failed attempt is `multiplier * 2^(n-1)`, clamped
//! to `[min_wait, max_wait]`. Input-validation errors are returned on the
//! first occurrence without waiting.

use crate::config::RetryConfig;
use crate::hub::HubResult;
use std::future::Future;
use std::time::Duration;

/// Retry configuration for one remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    multiplier: Duration,
    min_wait: Duration,
    max_wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, multiplier: Duration, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            multiplier,
            min_wait,
            max_wait: max_wait.max(min_wait),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.multiplier_ms),
            Duration::from_millis(config.min_wait_ms),
            Duration::from_millis(config.max_wait_ms),
        )
    }

    /// A policy that retries without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the attempt following failed attempt number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let wait = 2u32
            .checked_pow(exponent)
            .and_then(|factor| self.multiplier.checked_mul(factor))
            .unwrap_or(self.max_wait);
        wait.clamp(self.min_wait, self.max_wait)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent; the last error is returned in the latter cases
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> HubResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = HubResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => {
                    tracing::debug!("{} failed with non-retryable error: {}", what, e);
                    return Err(e);
                }
                Err(e) if attempt >= self.max_attempts => {
                    tracing::error!("{} failed after {} attempts: {}", what, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    let wait = self.backoff(attempt);
                    if e.is_rate_limited() {
                        tracing::warn!(
                            "{} rate limited (attempt {}/{}), backing off {:?}",
                            what,
                            attempt,
                            self.max_attempts,
                            wait
                        );
                    } else {
                        tracing::warn!(
                            "{} failed (attempt {}/{}), retrying in {:?}: {}",
                            what,
                            attempt,
                            self.max_attempts,
                            wait,
                            e
                        );
                    }
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
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
