//! Data Transfer Objects for the workflow API
//!
//! Every workflow endpoint wraps its payload in an envelope carrying a
//! `status` string. Only `"success"` envelopes carry meaningful data.

use serde::{Deserialize, Serialize};

use crate::domain::run::JobStatus;

/// Envelope status marking a successful response
pub const SUCCESS: &str = "success";

/// Response envelope shared by the workflow endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }
}

/// Payload of `GET /api/workflow/progress/{runId}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressData {
    pub status: JobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run::RunState;

    #[test]
    fn test_progress_envelope_parses() {
        let envelope: ApiEnvelope<ProgressData> = serde_json::from_value(serde_json::json!({
            "status": "success",
            "data": {
                "status": {
                    "progress": 30,
                    "current_step": "Data Extraction",
                    "status": "RUNNING"
                }
            }
        }))
        .unwrap();

        assert!(envelope.is_success());
        let data = envelope.data.unwrap();
        assert_eq!(data.status.status, RunState::Running);
        assert_eq!(data.status.progress, 30.0);
    }

    #[test]
    fn test_error_envelope_without_data() {
        let envelope: ApiEnvelope<ProgressData> = serde_json::from_value(serde_json::json!({
            "status": "error",
            "message": "run not found"
        }))
        .unwrap();

        assert!(!envelope.is_success());
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("run not found"));
    }
}
