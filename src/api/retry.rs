//! Rate-limit retry decorator with exponential backoff.
//!
//! Every call to the Result Archive Store goes through [`retry`]. Only errors
//! that report themselves as retryable (rate limiting) are attempted again;
//! everything else is handed straight back to the caller.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Growth per retry. Values below 1.0, or not finite, count as 1.0.
    pub backoff_factor: f64,
    /// Scale each delay by a random 50% to 150%.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// How long to wait before retry number `retry` (0 for the first).
    ///
    /// Never exceeds `max_delay` before jitter is applied, and never panics
    /// whatever the configured values are.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = if self.backoff_factor.is_finite() && self.backoff_factor >= 1.0 {
            self.backoff_factor
        } else {
            1.0
        };
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let seconds = self.base_delay.as_secs_f64() * factor.powi(exponent);

        let nominal = Duration::try_from_secs_f64(seconds)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        if self.jitter {
            nominal.mul_f64(0.5 + fastrand::f64())
        } else {
            nominal
        }
    }
}

pub trait RetryableError {
    fn is_retryable(&self) -> bool;
}

/// Run `op` until it succeeds, fails with an error that is not retryable,
/// or uses up `max_attempts`. The last error is handed back.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    let attempts = cfg.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => err,
        };

        if attempt >= attempts {
            warn!(error = %err, attempts, "still rate limited, giving up");
            return Err(err);
        }

        let delay = cfg.backoff(attempt - 1);
        warn!(
            error = %err,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "server is rate limiting, backing off"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
