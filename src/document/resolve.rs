//! Binary fetch collaborator: downloads image bytes for image blocks.
//!
//! `ImageFetcher` keeps the block renderer free of HTTP knowledge; the
//! default implementation wraps a shared `reqwest` client. Tests substitute
//! an in-memory fetcher.

use async_trait::async_trait;

use crate::error::ImprentaError;

/// Fetches the raw bytes behind an image URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImprentaError>;
}

/// HTTP fetcher backed by a reqwest client.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Build a fetcher with the library's user agent.
    pub fn new() -> Result<Self, ImprentaError> {
        let client = reqwest::Client::builder()
            .user_agent("imprenta/0.1")
            .build()
            .map_err(|e| ImprentaError::ExternalCall(format!("HTTP client error: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImprentaError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImprentaError::ExternalCall(format!("Failed to download {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(ImprentaError::ExternalCall(format!(
                "Failed to download {url}: HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImprentaError::ExternalCall(format!("Failed to read image data: {e}")))?;
        Ok(bytes.to_vec())
    }
}
