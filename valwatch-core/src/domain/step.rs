//! Validation phases
//!
//! The validation service walks through six fixed phases. Each phase owns a
//! progress threshold, and its display state is a pure function of the
//! current progress percentage. Nothing here is ever stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the fixed phases of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationStep {
    DocumentAccessVerification,
    DataExtraction,
    ValidationCriteriaLoading,
    RunningValidationChecks,
    CalculatingScores,
    StoringResults,
}

impl ValidationStep {
    /// All phases in execution order
    pub const ALL: [ValidationStep; 6] = [
        Self::DocumentAccessVerification,
        Self::DataExtraction,
        Self::ValidationCriteriaLoading,
        Self::RunningValidationChecks,
        Self::CalculatingScores,
        Self::StoringResults,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::DocumentAccessVerification => "Document Access Verification",
            Self::DataExtraction => "Data Extraction",
            Self::ValidationCriteriaLoading => "Validation Criteria Loading",
            Self::RunningValidationChecks => "Running Validation Checks",
            Self::CalculatingScores => "Calculating Scores",
            Self::StoringResults => "Storing Results",
        }
    }

    /// Progress percentage at which this phase counts as completed
    pub fn threshold(&self) -> f64 {
        match self {
            Self::DocumentAccessVerification => 10.0,
            Self::DataExtraction => 30.0,
            Self::ValidationCriteriaLoading => 40.0,
            Self::RunningValidationChecks => 70.0,
            Self::CalculatingScores => 90.0,
            Self::StoringResults => 100.0,
        }
    }

    /// Display state of this phase at the given progress
    pub fn state_at(&self, progress: f64) -> StepState {
        let index = Self::ALL
            .iter()
            .position(|step| step == self)
            .unwrap_or_default();
        let lower = if index == 0 {
            0.0
        } else {
            Self::ALL[index - 1].threshold()
        };

        if progress >= self.threshold() {
            StepState::Completed
        } else if progress >= lower {
            StepState::Current
        } else {
            StepState::Pending
        }
    }
}

impl fmt::Display for ValidationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display state of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    Completed,
    Current,
    Pending,
}

/// Every phase paired with its state at `progress`
pub fn step_states(progress: f64) -> [(ValidationStep, StepState); 6] {
    ValidationStep::ALL.map(|step| (step, step.state_at(progress)))
}

/// Index of the phase currently in progress, if any
///
/// Returns `None` once every phase is completed.
pub fn current_step_index(progress: f64) -> Option<usize> {
    ValidationStep::ALL
        .iter()
        .position(|step| step.state_at(progress) == StepState::Current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_are_ordered() {
        let thresholds: Vec<f64> = ValidationStep::ALL.iter().map(|s| s.threshold()).collect();
        assert_eq!(thresholds, vec![10.0, 30.0, 40.0, 70.0, 90.0, 100.0]);
    }

    #[test]
    fn test_step_states_at_zero() {
        let states = step_states(0.0);
        assert_eq!(states[0].1, StepState::Current);
        assert!(states[1..].iter().all(|(_, s)| *s == StepState::Pending));
    }

    #[test]
    fn test_step_states_mid_run() {
        let states = step_states(50.0);
        assert_eq!(states[0].1, StepState::Completed);
        assert_eq!(states[1].1, StepState::Completed);
        assert_eq!(states[2].1, StepState::Completed);
        assert_eq!(states[3].1, StepState::Current);
        assert_eq!(states[4].1, StepState::Pending);
        assert_eq!(states[5].1, StepState::Pending);
    }

    #[test]
    fn test_threshold_boundary_moves_to_next_step() {
        assert_eq!(
            ValidationStep::DataExtraction.state_at(30.0),
            StepState::Completed
        );
        assert_eq!(
            ValidationStep::ValidationCriteriaLoading.state_at(30.0),
            StepState::Current
        );
        assert_eq!(current_step_index(30.0), Some(2));
    }

    #[test]
    fn test_all_completed_at_hundred() {
        assert!(
            step_states(100.0)
                .iter()
                .all(|(_, s)| *s == StepState::Completed)
        );
        assert_eq!(current_step_index(100.0), None);
    }

    #[test]
    fn test_current_step_index() {
        assert_eq!(current_step_index(5.0), Some(0));
        assert_eq!(current_step_index(75.0), Some(4));
        assert_eq!(current_step_index(99.9), Some(5));
    }
}
