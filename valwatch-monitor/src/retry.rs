//! Retry policy for failed progress fetches

use std::time::Duration;

/// Backoff and give-up rules for consecutive fetch failures
///
/// Each failure delays the next poll by `base * 2^(failures - 1)`, capped at
/// `max_backoff`, where `base` is the poll interval. Any successful fetch
/// resets the count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failures in a row after which the connection is declared lost;
    /// `None` retries forever
    pub max_consecutive_failures: Option<u32>,
    /// Upper bound of the delay between retries
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Retry forever at the given maximum backoff
    pub fn unbounded(max_backoff: Duration) -> Self {
        Self {
            max_consecutive_failures: None,
            max_backoff,
        }
    }

    /// Whether `failures` consecutive failures exhaust the policy
    pub fn is_exhausted(&self, failures: u32) -> bool {
        self.max_consecutive_failures
            .is_some_and(|max| failures >= max)
    }

    /// Delay before the next poll after `failures` consecutive failures
    pub fn backoff(&self, base: Duration, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        base.saturating_mul(1 << exponent).min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: Some(10),
            max_backoff: Duration::from_secs(30),
        }
    }
}
