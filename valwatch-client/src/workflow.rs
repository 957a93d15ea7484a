//! Workflow API endpoints

use crate::ValidationClient;
use crate::error::{ClientError, Result};
use valwatch_core::domain::run::{JobStatus, RunId};
use valwatch_core::dto::ProgressData;

impl ValidationClient {
    // =============================================================================
    // Run Progress
    // =============================================================================

    /// Get the latest status of a run
    ///
    /// # Arguments
    /// * `run_id` - The run identifier
    ///
    /// # Returns
    /// The status snapshot carried by a success envelope
    pub async fn get_progress(&self, run_id: &RunId) -> Result<JobStatus> {
        let url = self.progress_url(run_id);
        tracing::debug!("Fetching progress for run {}", run_id);
        let response = self.client.get(&url).send().await?;

        let envelope = self.handle_envelope::<ProgressData>(response).await?;
        envelope
            .data
            .map(|data| data.status)
            .ok_or_else(|| ClientError::ParseError("Success envelope without data".to_string()))
    }

    // =============================================================================
    // Run Control
    // =============================================================================

    /// Request cancellation of a run
    ///
    /// The service acknowledges the request, it does not confirm the run has
    /// stopped. Subsequent progress fetches report the actual state.
    ///
    /// # Arguments
    /// * `run_id` - The run to cancel
    pub async fn cancel(&self, run_id: &RunId) -> Result<()> {
        let url = self.cancel_url(run_id);
        tracing::debug!("Requesting cancellation of run {}", run_id);
        let response = self.client.post(&url).send().await?;

        self.handle_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    fn progress_url(&self, run_id: &RunId) -> String {
        format!("{}/api/workflow/progress/{}", self.base_url, run_id)
    }

    fn cancel_url(&self, run_id: &RunId) -> String {
        format!("{}/api/workflow/cancel/{}", self.base_url, run_id)
    }
}
