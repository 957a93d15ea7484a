//! Valwatch Monitor
//!
//! Live progress polling for a validation run.
//!
//! Architecture:
//! - Configuration: tick interval, retry policy, cancel window
//! - State: the display state of a watched run and its update rules
//! - Poller: one task per watched run, owned by a cancellable handle
//! - Monitor: follows the currently selected run, one poller at a time

pub mod config;
pub mod error;
pub mod monitor;
pub mod poller;
pub mod retry;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{PollerConfig, RegressionPolicy};
pub use error::{MonitorError, Result};
pub use monitor::ProgressMonitor;
pub use poller::{CompletionCallback, PollExit, PollerHandle, ProgressPoller};
pub use retry::RetryPolicy;
pub use state::{ConnectionState, DetailedProgress, PollerState};
