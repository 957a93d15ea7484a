//! Run domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one validation run
///
/// Never empty: blank input is rejected by [`RunId::parse`], which is how
/// callers distinguish "no run in progress" from a run to watch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Parse a run id, returning `None` for empty or whitespace-only input
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run lifecycle state as reported by the validation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunState {
    Running,
    Completed,
    Failed,
    Error,
    Cancelled,
}

impl RunState {
    /// Whether no further progress updates are expected
    ///
    /// `Cancelled` is not part of this set: it is normally reached through a
    /// local optimistic update that the server has not confirmed yet.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status snapshot of a run, one per successful progress fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Percentage in [0, 100]
    #[serde(default)]
    pub progress: f64,
    /// Human-readable label of the current phase
    #[serde(default)]
    pub current_step: String,
    pub status: RunState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_check: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_checks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present only once the run has finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_status: Option<String>,
}

impl JobStatus {
    /// A running snapshot with no optional fields set
    pub fn running(progress: f64, current_step: impl Into<String>) -> Self {
        Self {
            progress,
            current_step: current_step.into(),
            status: RunState::Running,
            current_check: None,
            total_checks: None,
            overall_score: None,
            error: None,
            final_status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_rejects_blank_input() {
        assert!(RunId::parse("").is_none());
        assert!(RunId::parse("   ").is_none());
        assert_eq!(RunId::parse(" abc123 ").unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(RunState::Error.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(!RunState::Cancelled.is_terminal());
    }

    #[test]
    fn test_job_status_from_minimal_json() {
        let status: JobStatus = serde_json::from_value(serde_json::json!({
            "progress": 50,
            "current_step": "Running checks",
            "status": "RUNNING"
        }))
        .unwrap();

        assert_eq!(status, JobStatus::running(50.0, "Running checks"));
    }

    #[test]
    fn test_job_status_completion_fields() {
        let status: JobStatus = serde_json::from_value(serde_json::json!({
            "progress": 100,
            "current_step": "Storing Results",
            "status": "COMPLETED",
            "current_check": 12,
            "total_checks": 12,
            "overall_score": 87.5,
            "final_status": "PASSED"
        }))
        .unwrap();

        assert_eq!(status.status, RunState::Completed);
        assert_eq!(status.overall_score, Some(87.5));
        assert_eq!(status.final_status.as_deref(), Some("PASSED"));
        assert_eq!(status.current_check, Some(12));
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let result: Result<JobStatus, _> =
            serde_json::from_value(serde_json::json!({ "progress": 5, "status": "PAUSED" }));
        assert!(result.is_err());
    }
}
