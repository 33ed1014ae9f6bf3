//! Live substring filter for the note list.
//!
//! # Responsibility
//! - Normalize raw search box text into a filter.
//! - Decide whether a note matches, and derive visible lists.
//!
//! # Invariants
//! - Matching is a case-insensitive substring test on heading OR content.
//! - An empty (after trim) query matches every note without scanning.
//! - `apply` always returns a fresh vector; it never aliases its input.

use crate::model::note::Note;
use log::warn;
use regex::{Regex, RegexBuilder};

/// Compiled filter for one query string.
#[derive(Debug, Clone)]
pub struct NoteFilter {
    query: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    All,
    Pattern(Regex),
    /// Used only when the query is too large to compile.
    Lowercase(String),
}

impl NoteFilter {
    /// Builds a filter from raw search box text.
    pub fn new(raw_query: &str) -> Self {
        let query = raw_query.trim().to_string();
        if query.is_empty() {
            return Self {
                query,
                matcher: Matcher::All,
            };
        }

        let matcher = match RegexBuilder::new(&regex::escape(&query))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Matcher::Pattern(pattern),
            Err(err) => {
                warn!(
                    "event=filter_compile module=search status=fallback query_len={} error={}",
                    query.chars().count(),
                    err
                );
                Matcher::Lowercase(query.to_lowercase())
            }
        };
        Self { query, matcher }
    }

    /// Normalized query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the filter lets every note through.
    pub fn matches_all(&self) -> bool {
        matches!(self.matcher, Matcher::All)
    }

    /// Case-insensitive substring test against heading or content.
    pub fn matches(&self, note: &Note) -> bool {
        match &self.matcher {
            Matcher::All => true,
            Matcher::Pattern(pattern) => {
                pattern.is_match(&note.heading) || pattern.is_match(&note.content)
            }
            Matcher::Lowercase(needle) => {
                note.heading.to_lowercase().contains(needle.as_str())
                    || note.content.to_lowercase().contains(needle.as_str())
            }
        }
    }

    /// Returns the matching notes in their original order.
    pub fn apply(&self, notes: &[Note]) -> Vec<Note> {
        if self.matches_all() {
            return notes.to_vec();
        }
        notes
            .iter()
            .filter(|note| self.matches(note))
            .cloned()
            .collect()
    }
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::NoteFilter;
    use crate::model::note::Note;

    fn sample() -> Vec<Note> {
        vec![
            Note::new("Milk", "buy milk"),
            Note::new("Work", "finish report"),
            Note::new("Ideas", "Read about MILKshakes"),
        ]
    }

    #[test]
    fn query_is_trimmed() {
        let filter = NoteFilter::new("  milk \n");
        assert_eq!(filter.query(), "milk");
    }

    #[test]
    fn blank_query_matches_everything() {
        let notes = sample();
        let filter = NoteFilter::new("   ");
        assert!(filter.matches_all());
        assert_eq!(filter.apply(&notes), notes);
    }

    #[test]
    fn matching_ignores_case_on_heading_and_content() {
        let notes = sample();
        let visible = NoteFilter::new("MILK").apply(&notes);
        let headings = visible.iter().map(|n| n.heading.as_str()).collect::<Vec<_>>();
        assert_eq!(headings, vec!["Milk", "Ideas"]);
    }

    #[test]
    fn matching_is_substring_not_token_based() {
        let notes = sample();
        let visible = NoteFilter::new("port").apply(&notes);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].heading, "Work");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let notes = vec![Note::new("price", "costs $5.00 (approx)"), Note::new("x", "5000")];
        let visible = NoteFilter::new("$5.00 (").apply(&notes);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].heading, "price");
    }

    #[test]
    fn no_match_yields_empty_list() {
        assert!(NoteFilter::new("zebra").apply(&sample()).is_empty());
    }
}
