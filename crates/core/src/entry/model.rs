use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Languages a feed can be published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    Jp,
    En,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Zh, Language::Jp, Language::En];

    /// Short code used in URLs, slugs and the persisted document keys.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::Jp => "jp",
            Language::En => "en",
        }
    }

    /// Display name shown to readers.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Zh => "中文",
            Language::Jp => "日本語",
            Language::En => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zh" => Ok(Language::Zh),
            "jp" => Ok(Language::Jp),
            "en" => Ok(Language::En),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// One published entry. Immutable once appended to a [`ContentDocument`].
///
/// Stored values are kept exactly as read: `publishedAt` stays the text that
/// was persisted and fields this type does not know about ride along in
/// `extra`, so rewriting the document never alters existing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    pub id: String,
    pub slug: String,
    pub language: Language,
    pub text: String,
    pub source_text: String,
    /// ISO-8601 timestamp, `2024-05-01T08:30:00.123Z` for entries created here.
    pub published_at: String,
    pub timezone: String,
    pub city: String,
    pub weather_summary: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentEntry {
    /// `publishedAt` as an instant, if it parses as RFC 3339.
    pub fn published_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Format a creation instant the way `publishedAt` is stored.
pub fn format_published_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fields supplied by the author when creating an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub language: Language,
    pub text: String,
    pub source_text: String,
    pub timezone: String,
    pub city: String,
    pub weather_summary: String,
}

/// The whole persisted state: one entry sequence per language, in insertion order.
///
/// A stored document missing a language key reads back with an empty
/// sequence for it, so all three keys are always present once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    #[serde(default)]
    pub zh: Vec<ContentEntry>,
    #[serde(default)]
    pub jp: Vec<ContentEntry>,
    #[serde(default)]
    pub en: Vec<ContentEntry>,
    /// Top-level keys other than the three languages, preserved on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self, language: Language) -> &[ContentEntry] {
        match language {
            Language::Zh => &self.zh,
            Language::Jp => &self.jp,
            Language::En => &self.en,
        }
    }

    pub fn entries_mut(&mut self, language: Language) -> &mut Vec<ContentEntry> {
        match language {
            Language::Zh => &mut self.zh,
            Language::Jp => &mut self.jp,
            Language::En => &mut self.en,
        }
    }

    /// Total number of entries across every language.
    pub fn len(&self) -> usize {
        self.zh.len() + self.jp.len() + self.en.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
