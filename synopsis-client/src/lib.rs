//! Synopsis inference client
//!
//! A small, type-safe HTTP client for the asynchronous inference service
//! that runs summarization jobs. The service exposes two endpoints:
//! `POST /run` to submit work and `GET /status/{id}` to follow it.
//!
//! # Example
//!
//! ```no_run
//! use synopsis_client::InferenceClient;
//! use synopsis_core::domain::document::{ObjectLocation, SourceDocument};
//! use synopsis_core::domain::request::{GenerationParams, SummarizationRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = InferenceClient::new("https://api.example.com/v2/endpoint", "secret");
//!
//!     let doc = SourceDocument::new(ObjectLocation::new("in", "a.txt"), "hello".into());
//!     let request = SummarizationRequest::from_document(&doc, GenerationParams::default());
//!     let job_id = client.submit_job(&request).await?;
//!
//!     let report = client.job_status(&job_id).await?;
//!     println!("{} is {}", job_id, report.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the inference service API
#[derive(Clone)]
pub struct InferenceClient {
    /// Base URL of the endpoint (e.g., "https://api.example.com/v2/abc123")
    base_url: String,
    /// Bearer credential sent with every request
    api_key: String,
    /// HTTP client instance
    client: Client,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl InferenceClient {
    /// Create a new inference client
    ///
    /// # Arguments
    /// * `base_url` - The endpoint base URL
    /// * `api_key` - The credential sent as a bearer token
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Create a client whose requests give up after `timeout`
    ///
    /// A timed out request surfaces as [`ClientError::RequestFailed`].
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, api_key, client))
    }

    /// Create a new inference client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the base URL of the endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle an API response and deserialize JSON
    ///
    /// Any non-2xx status becomes [`ClientError::ApiError`] carrying the body.
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
}
