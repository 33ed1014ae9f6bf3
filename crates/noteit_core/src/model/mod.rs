//! Domain model for the note list.
//!
//! # Responsibility
//! - Define the canonical note record shared by storage, list and editor.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`, never by its content.

pub mod note;
