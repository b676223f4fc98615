//! Backoff policy for the request engine's retry loop.

use std::time::Duration;

/// Retry budget and backoff curve for one logical request.
///
/// The delay before attempt `n + 1` is `base_delay * 2^(n-1)` plus up to
/// one second of uniform jitter, capped at `max_delay`. A server-provided
/// `Retry-After` hint overrides the curve (still capped at `max_delay`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempt budget for one logical request, including the first.
    pub max_attempts: u32,
    /// First-retry delay before exponential growth.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after a retryable failure on attempt `attempt`.
    ///
    /// Never negative and never above `max_delay`; the exponent is clamped
    /// so pathological attempt counts cannot overflow.
    pub fn delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(hint) = retry_after {
            return hint.min(self.max_delay);
        }

        let exponent = attempt.saturating_sub(1).min(31);
        let exponential = self.base_delay.as_secs_f64() * 2f64.powi(exponent as i32);
        let jitter = fastrand::f64();
        Duration::from_secs_f64((exponential + jitter).min(self.max_delay.as_secs_f64()))
    }
}
