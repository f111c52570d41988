//! Fetching artifact bytes into files
//!
//! [`ArtifactFetcher`] is the seam between retrieval orchestration and the
//! transport. [`HttpFetcher`] streams the response body to disk chunk by
//! chunk, so only one chunk of an image is held in memory at a time.

use crate::error::DownloadError;
use crate::session::redact_url;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Fetch a URL into a destination file
///
/// Implementations must leave no file behind when they fail.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download `url` into `dest`, returning the number of bytes written
    async fn fetch_to_file(&self, url: &Url, dest: &Path) -> Result<u64, DownloadError>;
}

/// HTTP(S) fetcher backed by `reqwest`
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher, optionally bounding each request with `timeout`
    pub fn new(timeout: Option<Duration>) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| crate::Error::Config {
            message: format!("failed to create HTTP client: {}", e),
            key: None,
        })?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch_to_file(&self, url: &Url, dest: &Path) -> Result<u64, DownloadError> {
        let shown = redact_url(url);

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| request_error(&shown, e))?;

        if !response.status().is_success() {
            return Err(DownloadError::Status {
                url: shown,
                status: response.status().as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| write_error(dest, e))?;

        let copied = copy_body(&mut response, &mut file, dest, &shown).await;

        drop(file);
        if copied.is_err() {
            // No partial artifacts left on disk
            if let Err(e) = tokio::fs::remove_file(dest).await {
                tracing::warn!(path = %dest.display(), error = %e, "could not remove partial file");
            }
        }
        copied
    }
}

async fn copy_body(
    response: &mut reqwest::Response,
    file: &mut tokio::fs::File,
    dest: &Path,
    shown: &str,
) -> Result<u64, DownloadError> {
    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| request_error(shown, e))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| write_error(dest, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| write_error(dest, e))?;
    Ok(written)
}

fn request_error(url: &str, e: reqwest::Error) -> DownloadError {
    if e.is_timeout() {
        DownloadError::Timeout {
            url: url.to_string(),
        }
    } else {
        DownloadError::Request {
            url: url.to_string(),
            reason: e.without_url().to_string(),
        }
    }
}

fn write_error(path: &Path, e: std::io::Error) -> DownloadError {
    DownloadError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
