//! Observix HTTP Client
//!
//! A type-safe HTTP client for the Observix control plane API, shared by the
//! agent (assignment polling) and the CLI (catalog management) so both speak
//! the same contract.

pub mod error;
mod agents;
mod assignments;
mod pipelines;

// Re-export commonly used types
pub use error::{ClientError, Result};

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// Default timeout applied to every request, matching the agent poll budget.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the Observix control plane API
///
/// Methods are grouped per resource:
/// - Pipeline management (create, list, update, delete)
/// - Assignment management (create, delete) and the agent poll
/// - Agent listing and health
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    /// Base URL of the control plane (e.g., "http://127.0.0.1:7000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ControlPlaneClient {
    /// Create a new control plane client with the default 10s timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    /// Create a client around a pre-configured reqwest `Client`, for custom
    /// timeouts or proxies.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the control plane
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body, or surface the
    /// error body verbatim.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle a response with no interesting body (e.g., DELETE operations).
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
