use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::Result;
use super::StorageBackend;
use crate::entry::ContentDocument;

/// Keeps the document in a pretty-printed JSON file on local disk.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    path: PathBuf,
}

impl FilesystemBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `document` into a uniquely named sibling temp file.
    async fn stage(&self, document: &ContentDocument) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let serialized = serde_json::to_string_pretty(document)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "content.json".to_string());
        let tmp = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

        fs::write(&tmp, serialized).await?;
        Ok(tmp)
    }

    /// Rename a staged file over the target, so readers never observe a
    /// half-written document.
    async fn write_atomically(&self, document: &ContentDocument) -> Result<()> {
        let tmp = self.stage(document).await?;
        if let Err(err) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Create the file holding the empty document unless one already exists.
    /// Linking never replaces an existing file, so a document another request
    /// created in the meantime is read back instead of being overwritten.
    async fn create_empty(&self) -> Result<ContentDocument> {
        let empty = ContentDocument::empty();
        let tmp = self.stage(&empty).await?;
        let linked = fs::hard_link(&tmp, &self.path).await;
        let _ = fs::remove_file(&tmp).await;

        match linked {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Content file created");
                Ok(empty)
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(path = %self.path.display(), "Content file appeared concurrently, reading it");
                let raw = fs::read_to_string(&self.path).await?;
                Ok(serde_json::from_str(&raw)?)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn read(&self) -> Result<ContentDocument> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Content file missing, initializing empty document");
                self.create_empty().await
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, document: &ContentDocument) -> Result<()> {
        self.write_atomically(document).await?;
        tracing::debug!(path = %self.path.display(), entries = document.len(), "Content file written");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "filesystem"
    }
}
