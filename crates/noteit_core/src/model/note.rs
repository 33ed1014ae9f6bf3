//! Note domain model.
//!
//! # Responsibility
//! - Define the single record rendered by the note grid and edited by the
//!   editing screen.
//! - Provide card preview derivation for grid display.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reused for another note.
//! - `heading` and `content` are always present (empty strings allowed).
//! - Updates replace the whole record; nothing mutates a note in place.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// User-authored record with a short heading and a free-form body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub heading: String,
    pub content: String,
    /// Creation or last-modification time in Unix epoch milliseconds.
    pub timestamp: i64,
}

impl Note {
    /// Creates a note with a generated id, stamped with the current time.
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), heading, content, now_epoch_ms())
    }

    /// Creates a note with a caller-provided id and timestamp.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: NoteId,
        heading: impl Into<String>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            heading: heading.into(),
            content: content.into(),
            timestamp,
        }
    }

    /// Returns a replacement of this note carrying new text and a fresh
    /// timestamp. The id is kept.
    pub fn replaced(&self, heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(self.id, heading, content, now_epoch_ms())
    }

    /// Single-line card summary of `content`.
    ///
    /// Whitespace runs collapse to one space; output longer than `max_chars`
    /// characters is cut and suffixed with `...`.
    pub fn preview(&self, max_chars: usize) -> String {
        let collapsed = WHITESPACE_RE.replace_all(&self.content, " ");
        let trimmed = collapsed.trim();
        if trimmed.chars().count() <= max_chars {
            return trimmed.to_string();
        }
        let mut cut = trimmed.chars().take(max_chars).collect::<String>();
        cut.push_str("...");
        cut
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before the epoch map to `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
