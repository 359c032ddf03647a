use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::Result;
use super::StorageBackend;
use crate::entry::ContentDocument;

/// In-process backend. Starts out "absent" and initializes on first read,
/// like the persistent backends do.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: RwLock<Option<ContentDocument>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds `document`.
    pub fn with_document(document: ContentDocument) -> Self {
        Self {
            document: RwLock::new(Some(document)),
            ..Self::default()
        }
    }

    /// Current stored document, without counting as a read.
    pub async fn snapshot(&self) -> Option<ContentDocument> {
        self.document.read().await.clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self) -> Result<ContentDocument> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(doc) = self.document.read().await.as_ref() {
            return Ok(doc.clone());
        }

        let mut slot = self.document.write().await;
        if slot.is_none() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(slot.get_or_insert_with(ContentDocument::empty).clone())
    }

    async fn write(&self, document: &ContentDocument) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.document.write().await = Some(document.clone());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
