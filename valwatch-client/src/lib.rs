//! Valwatch HTTP Client
//!
//! A small, type-safe HTTP client for the workflow API of the validation
//! service: fetching the progress of a run and requesting its cancellation.
//!
//! The [`ProgressSource`] trait is the seam the progress monitor depends on,
//! so the poll loop can be driven by something other than a live server.
//!
//! # Example
//!
//! ```no_run
//! use valwatch_client::ValidationClient;
//! use valwatch_core::domain::run::RunId;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ValidationClient::new("http://localhost:8000");
//!     let run_id = RunId::parse("abc123").expect("non-empty id");
//!
//!     let status = client.get_progress(&run_id).await?;
//!     println!("{} at {}%", status.current_step, status.progress);
//!     Ok(())
//! }
//! ```

pub mod error;
mod workflow;

pub use error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use valwatch_core::domain::run::{JobStatus, RunId};
use valwatch_core::dto::ApiEnvelope;

/// Where the progress monitor gets run status from
///
/// Implemented by [`ValidationClient`] over HTTP.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Fetch the latest status snapshot of a run
    ///
    /// A non-success envelope is reported as [`ClientError::Rejected`].
    async fn fetch_progress(&self, run_id: &RunId) -> Result<JobStatus>;

    /// Ask the service to cancel a run
    ///
    /// `Ok` only when the service acknowledged with a success envelope.
    async fn cancel_run(&self, run_id: &RunId) -> Result<()>;
}

/// HTTP client for the validation workflow API
#[derive(Debug, Clone)]
pub struct ValidationClient {
    /// Base URL of the validation service (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ValidationClient {
    /// Create a new validation client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the validation service
    ///
    /// # Example
    /// ```
    /// use valwatch_client::ValidationClient;
    ///
    /// let client = ValidationClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new validation client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use valwatch_client::ValidationClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ValidationClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the validation service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and decode the JSON envelope
    async fn handle_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))?;

        accept_envelope(envelope)
    }
}

/// Pass a success envelope through; anything else is a rejection
fn accept_envelope<T>(envelope: ApiEnvelope<T>) -> Result<ApiEnvelope<T>> {
    if !envelope.is_success() {
        return Err(ClientError::Rejected {
            status: envelope.status,
            message: envelope.message,
        });
    }

    Ok(envelope)
}

#[async_trait]
impl ProgressSource for ValidationClient {
    async fn fetch_progress(&self, run_id: &RunId) -> Result<JobStatus> {
        self.get_progress(run_id).await
    }

    async fn cancel_run(&self, run_id: &RunId) -> Result<()> {
        self.cancel(run_id).await
    }
}
