//! Error types for storage backends

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure other than "file does not exist"
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not valid JSON of the expected shape
    #[error("corrupt content document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request to the blob store could not be completed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Blob store answered with an unexpected status
    #[error("blob store failed to {operation} content data (status {status})")]
    Status { operation: &'static str, status: u16 },

    /// Write token cannot be sent as a header value
    #[error("invalid blob store credential")]
    InvalidCredential,
}

pub type Result<T> = std::result::Result<T, StoreError>;
