// Retry policy and backoff schedule for the request executor

use backoff::{backoff::Backoff, ExponentialBackoff};
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// How many times a logical request may be retried and how long to wait
/// between attempts.
///
/// The wait before retry `k` (counting from zero) is `base_delay * 2^k`:
/// with the default base that is 1s, 2s, 4s. There is no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Total attempts a logical request may make.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// A fresh backoff schedule for one logical request.
    pub fn backoff(&self) -> ExponentialBackoff {
        create_backoff(self.base_delay)
    }

    /// The sleeps a request that fails transiently every time goes through.
    pub fn delays(&self) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (0..self.max_retries)
            .map(|_| backoff.next_backoff().unwrap_or(MAX_BACKOFF_INTERVAL))
            .collect()
    }
}

/// Create a deterministic doubling backoff starting at `base`.
pub fn create_backoff(base: Duration) -> ExponentialBackoff {
    let mut backoff = ExponentialBackoff {
        current_interval: base,
        initial_interval: base,
        randomization_factor: 0.0,
        multiplier: 2.0,
        max_interval: MAX_BACKOFF_INTERVAL,
        // The attempt budget bounds the loop, not wall-clock time
        max_elapsed_time: None,
        ..Default::default()
    };
    backoff.reset();
    backoff
}
