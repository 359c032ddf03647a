//! Publish-time validation of author input.

use thiserror::Error;

use super::model::NewEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("published text cannot be empty")]
    EmptyText,
}

/// Validate that an entry has something worth publishing.
/// Runs before any storage I/O.
pub fn validate_new_entry(entry: &NewEntry) -> Result<(), ValidationError> {
    if entry.text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(())
}
