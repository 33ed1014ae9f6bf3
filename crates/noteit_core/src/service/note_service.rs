//! Note use-case service for the editing screen and stateless callers.
//!
//! # Responsibility
//! - Create, replace, look up, list and delete notes against a `NoteStore`.
//! - Keep every write a whole-collection read-modify-write.
//!
//! # Invariants
//! - `update_note` is a full replacement that keeps the note's position.
//! - New notes are appended, so list order stays insertion order.
//! - Headings are stored trimmed; content is stored verbatim.
//! - Nothing is written when a lookup misses.

use crate::model::note::{Note, NoteId};
use crate::search::filter::NoteFilter;
use crate::store::{NoteStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NoteNotFound(_) => None,
        }
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over a store implementation.
pub struct NoteService<S: NoteStore> {
    store: S,
}

impl<S: NoteStore> NoteService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends a new note and returns it.
    pub fn create_note(
        &self,
        heading: impl Into<String>,
        content: impl Into<String>,
    ) -> NoteServiceResult<Note> {
        let mut notes = self.store.load()?;
        let note = Note::new(trimmed(heading.into()), content);
        notes.push(note.clone());
        self.store.save(&notes)?;
        info!(
            "event=note_create module=service status=ok note_id={} count={}",
            note.id,
            notes.len()
        );
        Ok(note)
    }

    /// Replaces heading and content of an existing note.
    pub fn update_note(
        &self,
        id: NoteId,
        heading: impl Into<String>,
        content: impl Into<String>,
    ) -> NoteServiceResult<Note> {
        let mut notes = self.store.load()?;
        let slot = notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        let updated = slot.replaced(trimmed(heading.into()), content);
        *slot = updated.clone();
        self.store.save(&notes)?;
        info!(
            "event=note_update module=service status=ok note_id={} content_len={}",
            id,
            updated.content.chars().count()
        );
        Ok(updated)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> NoteServiceResult<Option<Note>> {
        let notes = self.store.load()?;
        Ok(notes.into_iter().find(|note| note.id == id))
    }

    /// Lists notes matching `query` (blank lists all) in stored order.
    pub fn list_notes(&self, query: &str) -> NoteServiceResult<Vec<Note>> {
        let notes = self.store.load()?;
        let filter = NoteFilter::new(query);
        if filter.matches_all() {
            return Ok(notes);
        }
        Ok(notes.into_iter().filter(|note| filter.matches(note)).collect())
    }

    /// Deletes one note. Returns `false`, without saving, when absent.
    pub fn delete_note(&self, id: NoteId) -> NoteServiceResult<bool> {
        let mut notes = self.store.load()?;
        let before = notes.len();
        notes.retain(|note| note.id != id);
        if notes.len() == before {
            return Ok(false);
        }
        self.store.save(&notes)?;
        info!(
            "event=note_delete module=service status=ok note_id={} remaining={}",
            id,
            notes.len()
        );
        Ok(true)
    }
}

fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}
