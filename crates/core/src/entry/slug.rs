//! Entry slug utilities.
//!
//! Slugs follow the convention `{language}-{YYYYMMDDHHmmssSSS}`, with the
//! timestamp taken from the entry's creation instant in UTC:
//! - `zh-20240501083000123`
//! - `en-20241231235959999`

use std::fmt;

use chrono::{DateTime, NaiveDate, Timelike, Utc};

use super::model::Language;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";
const TIMESTAMP_LEN: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slug {
    pub language: Language,
    pub created_at: DateTime<Utc>,
}

impl Slug {
    /// Build a slug for an entry created at `created_at`. Sub-millisecond
    /// precision is dropped.
    pub fn new(language: Language, created_at: DateTime<Utc>) -> Self {
        Self {
            language,
            created_at: truncate_to_millis(created_at),
        }
    }

    /// Parse a slug back into its language and creation instant.
    /// Returns `None` for anything that does not follow the convention.
    pub fn parse(slug: &str) -> Option<Self> {
        let (code, timestamp) = slug.split_once('-')?;
        let language = code.parse().ok()?;
        if timestamp.len() != TIMESTAMP_LEN || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let field = |range: std::ops::Range<usize>| timestamp[range].parse::<u32>().ok();
        let year = timestamp[0..4].parse::<i32>().ok()?;
        let created_at = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?
            .and_hms_milli_opt(field(8..10)?, field(10..12)?, field(12..14)?, field(14..17)?)?
            .and_utc();

        Some(Self {
            language,
            created_at,
        })
    }

    /// The compact timestamp part, without the language prefix.
    pub fn timestamp(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.language, self.timestamp())
    }
}

/// Drop everything below a millisecond, matching what the persisted format keeps.
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    let millis = at.nanosecond() / 1_000_000 * 1_000_000;
    at.with_nanosecond(millis).unwrap_or(at)
}
