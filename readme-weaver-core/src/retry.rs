//! Retry policy for backend calls made by the driver.
//!
//! The default policy retries once after two seconds. Larger `max_retries` and a
//! `backoff_multiplier` above 1.0 turn it into bounded exponential backoff.

use std::time::Duration;

/// How often, and after how long, a failed backend call is attempted again.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Factor applied to the delay for every further retry.
    pub backoff_multiplier: f64,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once(Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// Retry exactly once after `delay`.
    pub fn once(delay: Duration) -> Self {
        Self {
            max_retries: 1,
            initial_delay: delay,
            backoff_multiplier: 1.0,
            max_delay: delay,
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-indexed), or `None` once retries are used up.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let factor = self.backoff_multiplier.max(1.0).powi(attempt as i32);
        let millis = (self.initial_delay.as_millis() as f64 * factor)
            .min(self.max_delay.as_millis() as f64);
        Some(Duration::from_millis(millis as u64))
    }
}
