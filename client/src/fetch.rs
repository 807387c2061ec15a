//! Remote JSON retrieval collaborator.
//!
//! [`Fetcher`] is the single transport seam for the client crate: it fetches
//! a URL and decodes the body as JSON, nothing more. Failures propagate
//! unchanged as transport errors; nothing here retries or interprets them.

use serde_json::Value;
use thiserror::Error;

/// Transport failure while fetching remote JSON.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, status, or decode failure from the HTTP client.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Fetches URLs and decodes their bodies as JSON.
#[derive(Debug, Default, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// A fetcher over a fresh HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetcher over a caller-configured HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET `url` and decode the response body as JSON.
    ///
    /// Non-success statuses are transport errors, not payloads.
    ///
    /// # Errors
    ///
    /// [`FetchError::Http`] for connection failures, error statuses, and
    /// bodies that are not valid JSON.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        tracing::debug!(url, "fetching remote json");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
