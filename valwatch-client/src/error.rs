//! Error types for the validation client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling the workflow API
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The response envelope did not report success
    #[error("Request rejected (envelope status {}){}", .status, rejection_detail(.message))]
    Rejected {
        /// Envelope status string
        status: String,
        /// Optional message from the envelope
        message: Option<String>,
    },
}

fn rejection_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if the server answered but declined the request
    ///
    /// Rejections carry no transport or decode problem, so pollers skip them
    /// instead of reporting a fetch failure.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = ClientError::Rejected {
            status: "error".to_string(),
            message: Some("run not found".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Request rejected (envelope status error): run not found"
        );
        assert!(err.is_rejected());

        let err = ClientError::Rejected {
            status: "pending".to_string(),
            message: None,
        };
        assert_eq!(err.to_string(), "Request rejected (envelope status pending)");
    }

    #[test]
    fn test_http_errors_are_not_rejections() {
        let err = ClientError::api_error(503, "down");
        assert_eq!(err.to_string(), "API error (status 503): down");
        assert!(!err.is_rejected());
        assert!(!ClientError::ParseError("eof".to_string()).is_rejected());
    }
}
