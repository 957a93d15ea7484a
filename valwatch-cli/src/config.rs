//! Configuration module
//!
//! Handles CLI configuration: the validation service URL and the poller
//! settings, which start from the environment and can be overridden by flags.

use anyhow::{Context, Result};
use std::time::Duration;
use valwatch_monitor::{PollerConfig, RegressionPolicy};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the validation service
    pub server_url: String,

    /// Poller settings
    pub poller: PollerConfig,
}

/// Flag overrides for the poller settings
#[derive(Debug, Clone, Default)]
pub struct PollerOverrides {
    pub interval_ms: Option<u64>,
    pub max_failures: Option<u32>,
    pub clamp_progress: bool,
}

impl Config {
    /// Loads the configuration, reading poller settings from the environment
    pub fn load(server_url: String) -> Result<Self> {
        let poller = PollerConfig::from_env().context("Invalid poller settings in environment")?;
        let config = Self { server_url, poller };
        config.validate()?;
        Ok(config)
    }

    /// Poller settings with flag overrides applied
    pub fn poller_with(&self, overrides: &PollerOverrides) -> Result<PollerConfig> {
        let mut poller = self.poller.clone();

        if let Some(ms) = overrides.interval_ms {
            poller.poll_interval = Duration::from_millis(ms);
        }

        if let Some(max) = overrides.max_failures {
            poller.retry.max_consecutive_failures = (max > 0).then_some(max);
        }

        if overrides.clamp_progress {
            poller.regression = RegressionPolicy::Clamp;
        }

        poller.validate()?;
        Ok(poller)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!("server_url must start with http:// or https://");
        }

        self.poller.validate()
    }
}
