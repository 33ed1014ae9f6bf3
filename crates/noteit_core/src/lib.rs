//! Core domain logic for NoteIt.
//! Owns the note list lifecycle: load, filter, mutate and persist.

pub mod config;
pub mod controller;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;
pub mod store;

pub use config::NoteitConfig;
pub use controller::{CancellationToken, ListIntent, ListWarning, NoteListController, NoteListView};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{now_epoch_ms, Note, NoteId};
pub use search::filter::NoteFilter;
pub use service::note_service::{NoteService, NoteServiceError, NoteServiceResult};
pub use store::{JsonFileNoteStore, NoteStore, ReadFailure, StoreError, StoreResult, WriteFailure};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
