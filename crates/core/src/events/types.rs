use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::ContentEntry;

/// Events emitted after a successful publish, consumed by whatever caches
/// rendered views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentEvent {
    Published(PublishedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEvent {
    pub entry: ContentEntry,
    /// View paths whose cached rendering is now stale.
    pub invalidate: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
