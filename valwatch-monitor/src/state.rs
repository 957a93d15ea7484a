//! Poller state
//!
//! The state published for one watched run. Only the poll task writes it:
//! through successful fetches, fetch failures, and acknowledged cancels.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use valwatch_core::domain::run::{JobStatus, RunId, RunState};
use valwatch_core::domain::step::{self, StepState, ValidationStep};
use valwatch_core::metrics;

use crate::config::{PollerConfig, RegressionPolicy};

/// Message shown while a fetch fails, without transport detail
pub const FETCH_ERROR: &str = "Failed to fetch progress";

/// Step label applied by an acknowledged cancel
pub const CANCELLED_STEP: &str = "cancelled";

/// Message shown when there is no run to watch
pub const NO_RUN_IN_PROGRESS: &str = "No validation run in progress";

/// Reachability of the validation service as seen by the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    /// The last `failures` fetches failed; polling continues with backoff
    Retrying { failures: u32 },
    /// The retry policy gave up; polling has stopped
    Lost,
}

/// Sub-progress and completion details of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailedProgress {
    pub current_check: Option<u32>,
    pub total_checks: Option<u32>,
    pub overall_score: Option<f64>,
    pub final_status: Option<String>,
}

/// What applying a fetched snapshot did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Applied,
    /// Ignored because it would move an acknowledged cancel back to RUNNING
    HeldCancelled,
}

/// Display state of one watched run
#[derive(Debug, Clone)]
pub struct PollerState {
    pub run_id: RunId,
    pub progress: f64,
    pub current_step: String,
    pub status: RunState,
    pub error: Option<String>,
    pub detailed: DetailedProgress,
    /// Monotonic activation time, fixed for the lifetime of the watch
    pub started_at: Instant,
    /// Recomputed on every applied snapshot; `None` outside (0, 100)
    pub estimated_remaining: Option<Duration>,
    /// Wall-clock time of the last applied snapshot
    pub last_updated: Option<DateTime<Utc>>,
    pub connection: ConnectionState,
    /// Set by an acknowledged cancel until the service confirms it
    pub cancel_requested_at: Option<Instant>,
}

impl PollerState {
    /// Fresh state for a run activated at `now`
    pub fn new(run_id: RunId, now: Instant) -> Self {
        Self {
            run_id,
            progress: 0.0,
            current_step: String::new(),
            status: RunState::Running,
            error: None,
            detailed: DetailedProgress::default(),
            started_at: now,
            estimated_remaining: None,
            last_updated: None,
            connection: ConnectionState::Connected,
            cancel_requested_at: None,
        }
    }

    /// Time since activation
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Whether at least one snapshot has been applied
    pub fn has_snapshot(&self) -> bool {
        self.last_updated.is_some()
    }

    /// Whether the cancel action is available
    ///
    /// The status is only known to be RUNNING once the service reported it.
    pub fn can_cancel(&self) -> bool {
        self.has_snapshot() && self.status == RunState::Running
    }

    /// Apply a snapshot from a success envelope
    pub fn apply_snapshot(
        &mut self,
        snapshot: &JobStatus,
        now: Instant,
        config: &PollerConfig,
    ) -> SnapshotOutcome {
        self.connection = ConnectionState::Connected;
        self.clear_fetch_error();

        if let Some(requested_at) = self.cancel_requested_at {
            if snapshot.status == RunState::Running {
                if now.saturating_duration_since(requested_at) < config.cancel_confirm_timeout {
                    debug!(
                        "Run {} still reported RUNNING after cancel, keeping CANCELLED",
                        self.run_id
                    );
                    return SnapshotOutcome::HeldCancelled;
                }
                warn!(
                    "Cancellation of run {} not confirmed after {:?}, following the service again",
                    self.run_id, config.cancel_confirm_timeout
                );
            }
            self.cancel_requested_at = None;
        }

        let mut progress = snapshot.progress;
        if progress < self.progress {
            debug!(
                "Progress of run {} went back from {} to {}",
                self.run_id, self.progress, progress
            );
            if config.regression == RegressionPolicy::Clamp {
                progress = self.progress;
            }
        }

        self.progress = progress;
        self.current_step = snapshot.current_step.clone();
        self.status = snapshot.status;
        self.error = snapshot.error.clone();
        self.detailed = DetailedProgress {
            current_check: snapshot.current_check,
            total_checks: snapshot.total_checks,
            overall_score: snapshot.overall_score,
            final_status: snapshot.final_status.clone(),
        };
        self.estimated_remaining = metrics::estimate_remaining(self.elapsed(now), progress);
        self.last_updated = Some(Utc::now());

        SnapshotOutcome::Applied
    }

    /// Record a transport or decode failure, keeping last-known-good data
    pub fn record_fetch_failure(&mut self, failures: u32, lost: bool) {
        self.error = Some(FETCH_ERROR.to_string());
        self.connection = if lost {
            ConnectionState::Lost
        } else {
            ConnectionState::Retrying { failures }
        };
    }

    /// The service answered with a non-success envelope
    ///
    /// Run data is left as it was, but the service is reachable again.
    pub fn record_rejection(&mut self) {
        self.connection = ConnectionState::Connected;
        self.clear_fetch_error();
    }

    fn clear_fetch_error(&mut self) {
        if self.error.as_deref() == Some(FETCH_ERROR) {
            self.error = None;
        }
    }

    /// Optimistic transition after the service acknowledged a cancel
    pub fn apply_cancel_ack(&mut self, now: Instant) {
        self.status = RunState::Cancelled;
        self.current_step = CANCELLED_STEP.to_string();
        self.cancel_requested_at = Some(now);
    }

    /// Phase display derived from the current progress
    pub fn step_states(&self) -> [(ValidationStep, StepState); 6] {
        step::step_states(self.progress)
    }

    pub fn current_step_index(&self) -> Option<usize> {
        step::current_step_index(self.progress)
    }

    /// `Final Score: 87.5% (PASSED)` once the service reported a score
    pub fn final_score_line(&self) -> Option<String> {
        metrics::format_final_score(
            self.detailed.overall_score,
            self.detailed.final_status.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (PollerState, Instant) {
        let now = Instant::now();
        (PollerState::new(RunId::parse("abc123").unwrap(), now), now)
    }

    #[test]
    fn test_first_snapshot_at_activation() {
        let (mut state, now) = state();
        let config = PollerConfig::default();

        let outcome = state.apply_snapshot(&JobStatus::running(50.0, "Running checks"), now, &config);

        assert_eq!(outcome, SnapshotOutcome::Applied);
        assert_eq!(metrics::format_progress(state.progress), "50.0%");
        assert_eq!(state.current_step, "Running checks");
        assert_eq!(state.estimated_remaining, Some(Duration::ZERO));
        assert!(state.has_snapshot());
    }

    #[test]
    fn test_estimate_tracks_elapsed_time() {
        let (mut state, now) = state();
        let config = PollerConfig::default();

        state.apply_snapshot(
            &JobStatus::running(25.0, "Data Extraction"),
            now + Duration::from_secs(20),
            &config,
        );
        assert_eq!(state.estimated_remaining, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_estimate_cleared_outside_open_range() {
        let (mut state, now) = state();
        let config = PollerConfig::default();

        state.apply_snapshot(&JobStatus::running(40.0, "step"), now + Duration::from_secs(4), &config);
        assert!(state.estimated_remaining.is_some());

        state.apply_snapshot(&JobStatus::running(0.0, "restart"), now + Duration::from_secs(6), &config);
        assert_eq!(state.estimated_remaining, None);
    }

    #[test]
    fn test_fetch_failure_keeps_last_good_data() {
        let (mut state, now) = state();
        let config = PollerConfig::default();
        state.apply_snapshot(&JobStatus::running(20.0, "Data Extraction"), now, &config);

        state.record_fetch_failure(1, false);

        assert_eq!(state.error.as_deref(), Some(FETCH_ERROR));
        assert_eq!(state.progress, 20.0);
        assert_eq!(state.current_step, "Data Extraction");
        assert_eq!(state.connection, ConnectionState::Retrying { failures: 1 });

        state.apply_snapshot(&JobStatus::running(30.0, "Data Extraction"), now, &config);
        assert_eq!(state.error, None);
        assert_eq!(state.connection, ConnectionState::Connected);
    }

    #[test]
    fn test_application_error_surfaced_verbatim() {
        let (mut state, now) = state();
        let mut snapshot = JobStatus::running(35.0, "Data Extraction");
        snapshot.error = Some("Sheet 3 could not be read".to_string());

        state.apply_snapshot(&snapshot, now, &PollerConfig::default());
        assert_eq!(state.error.as_deref(), Some("Sheet 3 could not be read"));
    }

    #[test]
    fn test_regression_accepted_by_default() {
        let (mut state, now) = state();
        let config = PollerConfig::default();

        state.apply_snapshot(&JobStatus::running(60.0, "a"), now, &config);
        state.apply_snapshot(&JobStatus::running(45.0, "b"), now, &config);
        assert_eq!(state.progress, 45.0);
    }

    #[test]
    fn test_regression_clamped() {
        let (mut state, now) = state();
        let mut config = PollerConfig::default();
        config.regression = RegressionPolicy::Clamp;

        state.apply_snapshot(&JobStatus::running(60.0, "a"), now, &config);
        state.apply_snapshot(&JobStatus::running(45.0, "b"), now, &config);
        assert_eq!(state.progress, 60.0);
        assert_eq!(state.current_step, "b");
    }

    #[test]
    fn test_cancel_ack_holds_against_running_snapshots() {
        let (mut state, now) = state();
        let config = PollerConfig::default();
        state.apply_snapshot(&JobStatus::running(50.0, "checks"), now, &config);

        state.apply_cancel_ack(now);
        assert_eq!(state.status, RunState::Cancelled);
        assert_eq!(state.current_step, CANCELLED_STEP);
        assert!(!state.can_cancel());

        let outcome = state.apply_snapshot(
            &JobStatus::running(52.0, "checks"),
            now + Duration::from_secs(2),
            &config,
        );
        assert_eq!(outcome, SnapshotOutcome::HeldCancelled);
        assert_eq!(state.status, RunState::Cancelled);
        assert_eq!(state.progress, 50.0);
    }

    #[test]
    fn test_held_snapshot_clears_fetch_error() {
        let (mut state, now) = state();
        let config = PollerConfig::default();
        state.apply_snapshot(&JobStatus::running(50.0, "checks"), now, &config);
        state.record_fetch_failure(1, false);
        state.apply_cancel_ack(now);

        let outcome = state.apply_snapshot(
            &JobStatus::running(52.0, "checks"),
            now + Duration::from_secs(2),
            &config,
        );
        assert_eq!(outcome, SnapshotOutcome::HeldCancelled);
        assert_eq!(state.connection, ConnectionState::Connected);
        assert_eq!(state.error, None);
        assert_eq!(state.status, RunState::Cancelled);
    }

    #[test]
    fn test_rejection_keeps_data_and_application_error() {
        let (mut state, now) = state();
        let mut snapshot = JobStatus::running(35.0, "Data Extraction");
        snapshot.error = Some("Sheet 3 could not be read".to_string());
        state.apply_snapshot(&snapshot, now, &PollerConfig::default());

        state.record_rejection();
        assert_eq!(state.error.as_deref(), Some("Sheet 3 could not be read"));

        state.record_fetch_failure(2, false);
        state.record_rejection();
        assert_eq!(state.error, None);
        assert_eq!(state.connection, ConnectionState::Connected);
        assert_eq!(state.progress, 35.0);
        assert_eq!(state.current_step, "Data Extraction");
    }

    #[test]
    fn test_cancel_needs_a_reported_status() {
        let (mut state, now) = state();
        assert_eq!(state.status, RunState::Running);
        assert!(!state.can_cancel());

        state.apply_snapshot(
            &JobStatus::running(5.0, "Document Access Verification"),
            now,
            &PollerConfig::default(),
        );
        assert!(state.can_cancel());
    }

    #[test]
    fn test_unconfirmed_cancel_expires() {
        let (mut state, now) = state();
        let config = PollerConfig::default();
        state.apply_cancel_ack(now);

        let outcome = state.apply_snapshot(
            &JobStatus::running(55.0, "checks"),
            now + config.cancel_confirm_timeout,
            &config,
        );
        assert_eq!(outcome, SnapshotOutcome::Applied);
        assert_eq!(state.status, RunState::Running);
        assert!(state.cancel_requested_at.is_none());
    }

    #[test]
    fn test_server_state_after_cancel_is_applied() {
        let (mut state, now) = state();
        let config = PollerConfig::default();
        state.apply_cancel_ack(now);

        let mut snapshot = JobStatus::running(55.0, "stopped");
        snapshot.status = RunState::Cancelled;
        assert_eq!(
            state.apply_snapshot(&snapshot, now, &config),
            SnapshotOutcome::Applied
        );
        assert_eq!(state.current_step, "stopped");
        assert!(state.cancel_requested_at.is_none());
    }

    #[test]
    fn test_final_score_line() {
        let (mut state, now) = state();
        let snapshot = JobStatus {
            progress: 100.0,
            current_step: "Storing Results".to_string(),
            status: RunState::Completed,
            current_check: None,
            total_checks: None,
            overall_score: Some(87.5),
            error: None,
            final_status: Some("PASSED".to_string()),
        };

        state.apply_snapshot(&snapshot, now, &PollerConfig::default());
        assert_eq!(
            state.final_score_line().as_deref(),
            Some("Final Score: 87.5% (PASSED)")
        );
        assert_eq!(state.current_step_index(), None);
    }
}
