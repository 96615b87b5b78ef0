//! Framegrid HTTP Client
//!
//! A simple, type-safe HTTP client for the Framegrid coordinator API.
//!
//! This crate provides a unified interface for both the CLI and the worker to
//! interact with the coordinator, eliminating code duplication and ensuring
//! consistency.
//!
//! # Example
//!
//! ```no_run
//! use framegrid_client::CoordinatorClient;
//! use framegrid_core::dto::job::SubmitJob;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), framegrid_client::ClientError> {
//!     let client = CoordinatorClient::new("http://localhost:8080");
//!
//!     let job = client.submit_job(&SubmitJob {
//!         project: "scene".to_string(),
//!         start: 1,
//!         end: 250,
//!         priority: None,
//!     }).await?;
//!
//!     println!("Submitted job: {}", job.id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod renders;
mod tasks;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Framegrid coordinator API
///
/// Methods are organized into logical groups:
/// - Job lifecycle (submit, list, delete)
/// - Task protocol (request, complete, failed)
/// - Projects, artifacts and rendered frames
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    /// Base URL of the coordinator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl CoordinatorClient {
    /// Create a new coordinator client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the coordinator API
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a new coordinator client with a custom HTTP client
    ///
    /// This allows configuring timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the coordinator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
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

    /// Handle an API response that carries no useful body
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CoordinatorClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = CoordinatorClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = CoordinatorClient::with_client("http://localhost:8080", http_client);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
