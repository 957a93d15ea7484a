//! Poller configuration
//!
//! Defines the tunable parameters of the progress poller: tick interval,
//! retry policy, optimistic-cancel window and progress regression handling.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// How a progress value lower than the last accepted one is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegressionPolicy {
    /// Mirror whatever the service reports
    #[default]
    Accept,
    /// Keep the highest progress seen for the run
    Clamp,
}

/// Progress poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed interval between healthy polls
    pub poll_interval: Duration,

    /// Backoff and give-up rules for consecutive fetch failures
    pub retry: RetryPolicy,

    /// How long an acknowledged cancel shields the local CANCELLED status
    /// from poll results that still report RUNNING
    pub cancel_confirm_timeout: Duration,

    /// Handling of progress values that go backwards
    pub regression: RegressionPolicy,
}

impl PollerConfig {
    /// Creates a configuration with the given poll interval and defaults
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            retry: RetryPolicy::default(),
            cancel_confirm_timeout: Duration::from_secs(30),
            regression: RegressionPolicy::Accept,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - VALWATCH_POLL_INTERVAL_MS (default: 2000)
    /// - VALWATCH_MAX_FAILURES (default: 10, 0 retries forever)
    /// - VALWATCH_MAX_BACKOFF_SECS (default: 30)
    /// - VALWATCH_CANCEL_CONFIRM_SECS (default: 30)
    /// - VALWATCH_CLAMP_PROGRESS (true/false, default: false)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = env_number::<u64>("VALWATCH_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(max) = env_number::<u32>("VALWATCH_MAX_FAILURES")? {
            config.retry.max_consecutive_failures = (max > 0).then_some(max);
        }

        if let Some(secs) = env_number::<u64>("VALWATCH_MAX_BACKOFF_SECS")? {
            config.retry.max_backoff = Duration::from_secs(secs);
        }

        if let Some(secs) = env_number::<u64>("VALWATCH_CANCEL_CONFIRM_SECS")? {
            config.cancel_confirm_timeout = Duration::from_secs(secs);
        }

        if let Ok(value) = std::env::var("VALWATCH_CLAMP_PROGRESS") {
            let clamp: bool = value
                .parse()
                .map_err(|_| anyhow::anyhow!("VALWATCH_CLAMP_PROGRESS must be true or false"))?;
            if clamp {
                config.regression = RegressionPolicy::Clamp;
            }
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.retry.max_backoff < self.poll_interval {
            anyhow::bail!("max_backoff must not be shorter than poll_interval");
        }

        if self.retry.max_consecutive_failures == Some(0) {
            anyhow::bail!("max_consecutive_failures must be greater than 0 when set");
        }

        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

/// Reads an optional numeric environment variable
fn env_number<T: std::str::FromStr>(name: &str) -> anyhow::Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer, got {:?}", name, value)),
        Err(_) => Ok(None),
    }
}
