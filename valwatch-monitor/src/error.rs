//! Error types for the progress monitor

use thiserror::Error;
use valwatch_client::ClientError;
use valwatch_core::domain::run::{RunId, RunState};

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors surfaced by a poller handle
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Cancel is only offered while the run is RUNNING
    #[error("Run {run_id} cannot be cancelled in state {status}")]
    NotRunning { run_id: RunId, status: RunState },

    /// The cancel request failed or was declined
    #[error("Failed to cancel run: {0}")]
    Cancel(#[from] ClientError),

    /// The poll task has already exited
    #[error("Poller for run {0} has stopped")]
    Stopped(RunId),

    /// The poll task panicked or was aborted
    #[error("Poller task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
