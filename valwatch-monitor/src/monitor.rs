//! Progress monitor
//!
//! Keeps at most one poller alive, following whichever run is currently
//! selected. Selecting a different run, or none, tears the previous poller
//! down before anything else happens.

use tracing::debug;
use valwatch_core::domain::run::{JobStatus, RunId};

use crate::poller::{PollerHandle, ProgressPoller};

/// Watches the currently selected run
pub struct ProgressMonitor {
    poller: ProgressPoller,
    active: Option<PollerHandle>,
}

impl ProgressMonitor {
    pub fn new(poller: ProgressPoller) -> Self {
        Self {
            poller,
            active: None,
        }
    }

    /// Select the run to watch
    ///
    /// Re-selecting the run already being watched keeps its poller. Any other
    /// selection aborts the current poller first; a blank or absent id leaves
    /// the monitor idle.
    pub fn select<F>(&mut self, run_id: Option<&str>, on_complete: F) -> Option<&PollerHandle>
    where
        F: FnOnce(JobStatus) + Send + 'static,
    {
        let requested = run_id.and_then(RunId::parse);

        let unchanged = match (&self.active, &requested) {
            (Some(handle), Some(id)) => handle.run_id() == id && !handle.is_finished(),
            _ => false,
        };
        if unchanged {
            return self.active.as_ref();
        }

        if let Some(previous) = self.active.take() {
            debug!("Switching away from run {}", previous.run_id());
        }

        self.active = requested.and_then(|id| self.poller.start(id.as_str(), on_complete));
        self.active.as_ref()
    }

    /// Stop watching and wait for the poller to finish
    pub async fn clear(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.stop().await;
        }
    }

    pub fn active(&self) -> Option<&PollerHandle> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }
}
