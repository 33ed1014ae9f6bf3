//! Durable note persistence.
//!
//! # Responsibility
//! - Define the whole-collection storage contract used by the list
//!   controller and the editor service.
//! - Keep file format and I/O details behind `NoteStore`.
//!
//! # Invariants
//! - A missing document is an empty collection, not an error.
//! - An unreadable or malformed document is an error, never an empty list.
//! - `save` replaces the whole document atomically.

use crate::model::note::{Note, NoteId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod json_file;

pub use json_file::JsonFileNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error.
///
/// `Read` covers every load failure, `Write` every save failure.
#[derive(Debug)]
pub enum StoreError {
    Read { path: PathBuf, reason: ReadFailure },
    Write { path: PathBuf, reason: WriteFailure },
}

/// Cause of a failed load.
#[derive(Debug)]
pub enum ReadFailure {
    Io(io::Error),
    /// Document exists but is not a JSON array of notes.
    Malformed(serde_json::Error),
    /// Document holds two notes with the same id.
    DuplicateId(NoteId),
}

/// Cause of a failed save.
#[derive(Debug)]
pub enum WriteFailure {
    Io(io::Error),
    Encode(serde_json::Error),
}

impl StoreError {
    /// Whether this error came from a load.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Stable machine-readable code for log lines and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read {
                reason: ReadFailure::Io(_),
                ..
            } => "store_read_io",
            Self::Read {
                reason: ReadFailure::Malformed(_),
                ..
            } => "store_read_malformed",
            Self::Read {
                reason: ReadFailure::DuplicateId(_),
                ..
            } => "store_read_duplicate_id",
            Self::Write {
                reason: WriteFailure::Io(_),
                ..
            } => "store_write_io",
            Self::Write {
                reason: WriteFailure::Encode(_),
                ..
            } => "store_write_encode",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, reason } => {
                write!(f, "failed to read notes from `{}`: {reason}", path.display())
            }
            Self::Write { path, reason } => {
                write!(f, "failed to write notes to `{}`: {reason}", path.display())
            }
        }
    }
}

impl Display for ReadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Malformed(err) => write!(f, "malformed document: {err}"),
            Self::DuplicateId(id) => write!(f, "duplicate note id {id}"),
        }
    }
}

impl Display for WriteFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "encoding failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read {
                reason: ReadFailure::Io(err),
                ..
            } => Some(err),
            Self::Read {
                reason: ReadFailure::Malformed(err),
                ..
            } => Some(err),
            Self::Read {
                reason: ReadFailure::DuplicateId(_),
                ..
            } => None,
            Self::Write {
                reason: WriteFailure::Io(err),
                ..
            } => Some(err),
            Self::Write {
                reason: WriteFailure::Encode(err),
                ..
            } => Some(err),
        }
    }
}

/// Whole-collection note storage.
///
/// Implementations must be safe to move onto the storage worker thread.
pub trait NoteStore: Send {
    /// Reads the full collection in stored order.
    fn load(&self) -> StoreResult<Vec<Note>>;
    /// Replaces the full collection.
    fn save(&self, notes: &[Note]) -> StoreResult<()>;
}

impl<S: NoteStore + Sync + ?Sized> NoteStore for std::sync::Arc<S> {
    fn load(&self) -> StoreResult<Vec<Note>> {
        (**self).load()
    }

    fn save(&self, notes: &[Note]) -> StoreResult<()> {
        (**self).save(notes)
    }
}
