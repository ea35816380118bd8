//! Image host upload provider
//!
//! The [`ImageHost`] trait is the seam between the pipeline and the remote
//! image-hosting API; [`ImgbbHost`] is the production implementation for the
//! imgbb-compatible upload endpoint (form POST of base64 data, JSON response
//! with a `success` flag and `data.display_url`).

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default upload endpoint for the imgbb API.
pub const DEFAULT_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while uploading one image.
///
/// None of these are fatal to a run; the pipeline reports them per image and
/// moves on. No retry is performed.
#[derive(Debug, Error)]
pub enum UploadError {
    /// HTTP request to the image host failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape
    #[error("malformed image host response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Host answered, but did not accept the upload
    #[error("image host rejected the upload")]
    Rejected,
}

/// Configuration for an imgbb-compatible host.
#[derive(Debug, Clone)]
pub struct ImgbbConfig {
    /// API key sent as the `key` form field
    pub api_key: String,
    /// Upload endpoint URL
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ImgbbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Trait for remote image hosts.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload one image and return its public URL.
    async fn upload(&self, image: &[u8], name: &str) -> Result<String, UploadError>;
}

/// imgbb upload provider.
pub struct ImgbbHost {
    client: Client,
    config: ImgbbConfig,
}

impl ImgbbHost {
    /// Create a new imgbb provider sharing an existing HTTP client.
    pub fn new(client: Client, config: ImgbbConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    async fn upload(&self, image: &[u8], name: &str) -> Result<String, UploadError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        debug!(name, bytes = image.len(), "uploading image");

        let response = self
            .client
            .post(&self.config.endpoint)
            .timeout(self.config.timeout)
            .form(&[
                ("key", self.config.api_key.as_str()),
                ("image", encoded.as_str()),
                ("name", name),
            ])
            .send()
            .await?;

        let body = response.text().await?;
        let parsed: UploadResponse = serde_json::from_str(&body)?;

        match parsed {
            UploadResponse {
                success: true,
                data: Some(data),
            } => Ok(data.display_url),
            _ => Err(UploadError::Rejected),
        }
    }
}

/// imgbb JSON response, reduced to the fields consumed.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    display_url: String,
}
