//! Retry policy for delivery attempts.

use std::time::Duration;

/// Bounds and backoff schedule for one delivery's retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total transport calls per delivery, first attempt included.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub first_interval: Duration,
    /// Growth factor applied to the wait after each retry.
    pub backoff_multiplier: f64,
    /// Upper bound on any single wait.
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            first_interval: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Wait before the retry that follows failed attempt `attempt` (1-based):
    /// `first_interval * multiplier^(attempt - 1)`, capped at `max_interval`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.backoff_multiplier.powi(exponent as i32);
        let delay = self.first_interval.mul_f64(factor);
        delay.min(self.max_interval)
    }
}
