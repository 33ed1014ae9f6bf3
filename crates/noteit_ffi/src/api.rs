//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note list/edit operations to Dart via FRB.
//! - Flatten core errors into response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call is a whole-document read (and write when mutating).

use log::warn;
use noteit_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, JsonFileNoteStore,
    Note, NoteId, NoteService, NoteServiceError, NoteitConfig,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const PREVIEW_MAX_CHARS: usize = 100;
static NOTES_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Grid card item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note id in string form.
    pub id: String,
    pub heading: String,
    pub content: String,
    /// Single-line content summary for the card.
    pub preview: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        let preview = note.preview(PREVIEW_MAX_CHARS);
        Self {
            id: note.id.to_string(),
            heading: note.heading,
            content: note.content,
            preview,
            timestamp: note.timestamp,
        }
    }
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    /// Whether the document could be read.
    pub ok: bool,
    /// Visible notes in stored order.
    pub items: Vec<NoteItem>,
    /// Drives the empty-state message.
    pub is_empty: bool,
    /// Human-readable diagnostics.
    pub message: String,
}

/// Mutation response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Created/updated note; `None` for deletes and failures.
    pub note: Option<NoteItem>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<Note>) -> Self {
        Self {
            ok: true,
            note: note.map(NoteItem::from),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

/// Lists notes whose heading or content contains `query`.
///
/// # FFI contract
/// - Sync call, file-backed.
/// - Read failures return `ok=false` with an empty list, never a panic.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(query: String) -> NotesListResponse {
    notes_list_at(&resolve_notes_path(), &query)
}

/// Creates a note from the editing screen.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(heading: String, content: String) -> NoteActionResponse {
    note_create_at(&resolve_notes_path(), heading, content)
}

/// Replaces heading and content of note `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: String, heading: String, content: String) -> NoteActionResponse {
    note_update_at(&resolve_notes_path(), &id, heading, content)
}

/// Deletes note `id`. Deleting an unknown note succeeds without a write.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> NoteActionResponse {
    note_delete_at(&resolve_notes_path(), &id)
}

fn notes_list_at(path: &Path, query: &str) -> NotesListResponse {
    match service_at(path).list_notes(query) {
        Ok(notes) => {
            let items = notes.into_iter().map(NoteItem::from).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("Found {} note(s).", items.len())
            };
            NotesListResponse {
                ok: true,
                is_empty: items.is_empty(),
                items,
                message,
            }
        }
        Err(err) => {
            warn!("event=ffi_notes_list module=ffi status=error");
            NotesListResponse {
                ok: false,
                items: Vec::new(),
                is_empty: true,
                message: format!("notes_list failed: {err}"),
            }
        }
    }
}

fn note_create_at(path: &Path, heading: String, content: String) -> NoteActionResponse {
    match service_at(path).create_note(heading, content) {
        Ok(note) => NoteActionResponse::success("Note created.", Some(note)),
        Err(err) => NoteActionResponse::failure(format!("note_create failed: {err}")),
    }
}

fn note_update_at(path: &Path, id: &str, heading: String, content: String) -> NoteActionResponse {
    let id = match parse_note_id(id) {
        Ok(id) => id,
        Err(message) => return NoteActionResponse::failure(message),
    };
    match service_at(path).update_note(id, heading, content) {
        Ok(note) => NoteActionResponse::success("Note updated.", Some(note)),
        Err(NoteServiceError::NoteNotFound(_)) => {
            NoteActionResponse::failure(format!("note_update failed: note {id} not found"))
        }
        Err(err) => NoteActionResponse::failure(format!("note_update failed: {err}")),
    }
}

fn note_delete_at(path: &Path, id: &str) -> NoteActionResponse {
    let id = match parse_note_id(id) {
        Ok(id) => id,
        Err(message) => return NoteActionResponse::failure(message),
    };
    match service_at(path).delete_note(id) {
        Ok(true) => NoteActionResponse::success("Note deleted.", None),
        Ok(false) => NoteActionResponse::success("Note already absent.", None),
        Err(err) => NoteActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

fn service_at(path: &Path) -> NoteService<JsonFileNoteStore> {
    NoteService::new(JsonFileNoteStore::new(path))
}

fn parse_note_id(raw: &str) -> Result<NoteId, String> {
    NoteId::parse_str(raw.trim()).map_err(|err| format!("invalid note id `{raw}`: {err}"))
}

fn resolve_notes_path() -> PathBuf {
    NOTES_PATH
        .get_or_init(|| NoteitConfig::from_env().notes_path())
        .clone()
}
