// src/ingest/retry.rs
use std::future::Future;
use std::time::Duration;

use metrics::counter;
use tracing::warn;

use crate::config::briefing::FetchSection;

/// Exponential backoff: `min_delay * 2^(attempt-1)`, clamped to `[min_delay, max_delay]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(fetch: &FetchSection) -> Self {
        let min = fetch.backoff_min_ms.min(fetch.backoff_max_ms);
        let max = fetch.backoff_min_ms.max(fetch.backoff_max_ms);
        Self {
            max_attempts: fetch.max_attempts.max(1),
            min_delay: Duration::from_millis(min),
            max_delay: Duration::from_millis(max),
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.min_delay
            .saturating_mul(1u32 << shift)
            .clamp(self.min_delay, self.max_delay)
    }

    /// Run `op` under this policy.
    pub async fn run<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        retry_with_backoff(self.max_attempts, |n| self.delay_after(n), op).await
    }
}

/// Call `op` up to `max_attempts` times, sleeping `backoff(attempt)` between
/// failures. Returns the first success or the last error.
pub async fn retry_with_backoff<T, E, F, Fut, B>(
    max_attempts: u32,
    backoff: B,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: Fn(u32) -> Duration,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt >= max_attempts => {
                warn!(attempt, max = max_attempts, error = %e, "retries exhausted");
                return Err(e);
            }
            Err(e) => {
                let delay = backoff(attempt);
                warn!(attempt, max = max_attempts, ?delay, error = %e, "attempt failed; backing off");
                counter!("topic_unit_retries_total").increment(1);
                tokio::time::sleep(delay).await;
            }
        }
    }
}
