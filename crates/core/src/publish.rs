//! The publish action: validate, append, announce stale views.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::validate::validate_new_entry;
use crate::entry::{ContentEntry, Language, NewEntry, ValidationError};
use crate::events::{ContentEvent, EventBus, PublishedEvent};
use crate::storage::StoreError;
use crate::store::ContentStore;

/// What the editor submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPayload {
    pub language: Language,
    pub text: String,
    #[serde(default)]
    pub source_text: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub weather_summary: String,
}

impl From<PublishPayload> for NewEntry {
    fn from(payload: PublishPayload) -> Self {
        NewEntry {
            language: payload.language,
            text: payload.text,
            source_text: payload.source_text,
            timezone: payload.timezone,
            city: payload.city,
            weather_summary: payload.weather_summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Published {
    pub entry: ContentEntry,
    /// Views to revalidate: the language feed and the new entry's page.
    pub invalidate: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to store entry: {0}")]
    Store(#[from] StoreError),
}

/// Paths whose rendering changes when `entry` is published.
pub fn invalidated_paths(entry: &ContentEntry) -> Vec<String> {
    vec![
        format!("/{}", entry.language),
        format!("/{}/{}", entry.language, entry.slug),
    ]
}

pub async fn publish_entry(
    store: &ContentStore,
    bus: &EventBus,
    payload: PublishPayload,
) -> Result<Published, PublishError> {
    let input = NewEntry::from(payload);
    validate_new_entry(&input)?;

    let entry = store.append_entry(input).await?;
    let invalidate = invalidated_paths(&entry);

    let receivers = bus.publish(ContentEvent::Published(PublishedEvent {
        entry: entry.clone(),
        invalidate: invalidate.clone(),
        timestamp: Utc::now(),
    }));
    tracing::debug!(slug = %entry.slug, receivers, "Publish event sent");

    Ok(Published { entry, invalidate })
}
