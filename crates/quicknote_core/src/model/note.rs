//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its stable identifier.
//! - Own timestamp normalization so every layer agrees on precision.
//!
//! # Invariants
//! - `created_at` never changes after construction.
//! - `updated_at` never decreases and never precedes `created_at`.
//! - Timestamps carry millisecond precision so the wire form round-trips.

use chrono::{DateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Opaque unique identifier of one note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NoteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for NoteId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NoteId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One user-authored text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Plain text body. Empty for freshly created notes.
    pub content: String,
    /// Creation time, immutable after construction.
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    /// Time of the last content mutation.
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates an empty note whose timestamps both equal `at`.
    pub fn new(id: NoteId, at: DateTime<Utc>) -> Self {
        let at = truncate_to_millis(at);
        Self {
            id,
            content: String::new(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Replaces the full content and refreshes `updated_at`.
    ///
    /// # Invariants
    /// - A clock that stepped backwards keeps the previous `updated_at`.
    pub fn set_content(&mut self, content: String, at: DateTime<Utc>) {
        self.content = content;
        self.updated_at = truncate_to_millis(at).max(self.updated_at);
    }

    /// Returns whether both timestamps are consistent with each other.
    pub fn has_valid_timestamps(&self) -> bool {
        self.updated_at >= self.created_at
    }

    /// Derives a one-line label for list rendering.
    ///
    /// Rules:
    /// - First non-blank line, inner whitespace collapsed to single spaces.
    /// - Truncated to `max_chars` characters with `...` appended when cut.
    /// - `None` when the note has no visible text.
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        let line = self
            .content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())?;
        let normalized = WHITESPACE_RE.replace_all(line, " ");
        let mut preview: String = normalized.chars().take(max_chars).collect();
        if normalized.chars().count() > max_chars {
            preview.push_str("...");
        }
        Some(preview)
    }
}

/// Drops sub-millisecond precision from a timestamp.
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// Formats a timestamp in the persisted ISO-8601 form, e.g.
/// `2026-10-16T09:30:00.000Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Serde adapter for ISO-8601 timestamps with millisecond precision.
pub mod iso_millis {
    use super::{format_timestamp, truncate_to_millis};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.as_str())
            .map(|parsed| truncate_to_millis(parsed.with_timezone(&Utc)))
            .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{raw}`: {err}")))
    }
}
