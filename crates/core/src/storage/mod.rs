//! Storage backends for the content document.
//!
//! The whole document is read and written as one JSON blob. Which backend is
//! used is decided once at startup from [`BackendConfig`] and then injected
//! into the [`ContentStore`](crate::store::ContentStore).

pub mod error;
pub mod filesystem;
pub mod memory;
pub mod remote;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::entry::ContentDocument;

pub use error::{Result, StoreError};
pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;
pub use remote::RemoteBlobBackend;

pub const DEFAULT_CONTENT_FILE: &str = "content/content.json";
pub const DEFAULT_BLOB_STORE_URL: &str = "https://blob.vercel-storage.com";
pub const DEFAULT_BLOB_KEY: &str = "content/content.json";

/// Whole-document persistence.
///
/// `read` never fails because the document is absent: a backend initializes
/// and returns the empty document instead. Corrupt content is an error.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn read(&self) -> Result<ContentDocument>;

    async fn write(&self, document: &ContentDocument) -> Result<()>;

    /// Short name for logs and health output.
    fn kind(&self) -> &'static str;
}

/// Backend selection, resolved from configuration at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Filesystem {
        path: PathBuf,
    },
    RemoteBlob {
        base_url: String,
        key: String,
        token: String,
        timeout: Duration,
    },
}

impl BackendConfig {
    /// Remote mode when a write token is present, filesystem otherwise.
    pub fn select(
        token: Option<String>,
        base_url: Option<String>,
        key: Option<String>,
        content_file: Option<PathBuf>,
        timeout: Duration,
    ) -> Self {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => BackendConfig::RemoteBlob {
                base_url: base_url.unwrap_or_else(|| DEFAULT_BLOB_STORE_URL.to_string()),
                key: key.unwrap_or_else(|| DEFAULT_BLOB_KEY.to_string()),
                token,
                timeout,
            },
            None => BackendConfig::Filesystem {
                path: content_file.unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_FILE)),
            },
        }
    }
}

/// Build the backend described by `config`.
pub fn open_backend(config: &BackendConfig) -> Result<Arc<dyn StorageBackend>> {
    let backend: Arc<dyn StorageBackend> = match config {
        BackendConfig::Filesystem { path } => Arc::new(FilesystemBackend::new(path.clone())),
        BackendConfig::RemoteBlob {
            base_url,
            key,
            token,
            timeout,
        } => Arc::new(RemoteBlobBackend::new(base_url, key, token, *timeout)?),
    };
    tracing::info!(backend = backend.kind(), "Storage backend selected");
    Ok(backend)
}
