//! Retry policy for node requests.
//!
//! # Responsibilities
//! - Decide whether a failed request is worth repeating
//! - Enforce the retry budget (attempt count and total elapsed time)
//! - Produce the delay before the next attempt
//!
//! Delays double from `base_delay_ms` up to `max_delay_ms`, plus up to 10%
//! jitter so parallel requests do not retry in lockstep.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::fetcher::types::FetchError;

const BASE_DELAY_MS: u64 = 250;
const MAX_DELAY_MS: u64 = 10_000;

/// Retry settings for one request handle.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Total time after which no new attempt is started.
    pub max_elapsed: Duration,
    /// Retry every failure, including errors the node marks non-retriable.
    pub force_retry: bool,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            max_elapsed: Duration::from_secs(60),
            force_retry: false,
            base_delay_ms: BASE_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based), or `None` once the
    /// budget is spent or the error should not be retried.
    pub fn next_delay(&self, retry: u32, started: Instant, error: &FetchError) -> Option<Duration> {
        if retry > self.max_retries {
            return None;
        }
        if !self.force_retry && !error.is_retriable() {
            return None;
        }

        let delay = self.backoff(retry);
        if started.elapsed() + delay > self.max_elapsed {
            return None;
        }
        Some(delay)
    }

    /// Exponential delay with jitter for retry number `retry` (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        let doubling = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
        let capped = self.base_delay_ms.saturating_mul(doubling).min(self.max_delay_ms);
        let jitter = match capped / 10 {
            0 => 0,
            range => rand::thread_rng().gen_range(0..range),
        };
        Duration::from_millis(capped + jitter)
    }
}
