//! Binary blob transfer
//!
//! The uploader streams a local file to a one-time upload URL and hands the
//! raw status and body back. It deliberately does not judge the status: the
//! caller must check it, since storage endpoints can answer with a failure
//! status without the transport raising anything.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio_util::io::ReaderStream;

use crate::types::UploadUrl;

/// Errors raised before a transfer produced any HTTP response
#[derive(Debug, Error)]
pub enum TransferError {
    /// Local file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The request could not be sent or the response could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// The transfer exceeded its deadline
    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),

    /// The HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),
}

/// Result type for transfer operations
pub type Result<T> = std::result::Result<T, TransferError>;

/// Raw outcome of a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl UploadResponse {
    /// The storage endpoint answers exactly 200 on success
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Transfers a local file to an upload URL
#[async_trait]
pub trait BlobUploader: Send + Sync {
    /// Upload `file` as the raw request body with the given MIME type
    async fn upload(
        &self,
        target: &UploadUrl,
        file: &Path,
        mime_type: &str,
    ) -> Result<UploadResponse>;
}

/// [`BlobUploader`] over HTTP `POST` with a binary body
#[derive(Debug, Clone)]
pub struct HttpBlobUploader {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpBlobUploader {
    /// Default deadline for a single transfer
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Create an uploader with a bounded per-transfer timeout
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransferError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Configured transfer timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl BlobUploader for HttpBlobUploader {
    async fn upload(
        &self,
        target: &UploadUrl,
        file: &Path,
        mime_type: &str,
    ) -> Result<UploadResponse> {
        let io_error = |source| TransferError::Io {
            path: file.to_path_buf(),
            source,
        };
        let handle = tokio::fs::File::open(file).await.map_err(io_error)?;
        let size = handle.metadata().await.map_err(io_error)?.len();

        tracing::debug!(file = %file.display(), size, mime_type, "uploading blob");

        let response = self
            .client
            .post(target.as_str())
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(handle)))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransferError::Timeout(self.timeout)
                } else {
                    TransferError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        Ok(UploadResponse { status, body })
    }
}
