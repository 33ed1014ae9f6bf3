//! JSON document implementation of `NoteStore`.
//!
//! # Responsibility
//! - Persist the full collection as one JSON array file.
//! - Replace the document atomically through a sibling temp file.
//! - Assign ids to legacy records and write them back once.
//!
//! # Invariants
//! - Loaded collections never contain duplicate ids.
//! - A failed save leaves the previous document untouched.
//! - A note keeps its id across loads, including notes first read from a
//!   document that had no ids.

use super::{NoteStore, ReadFailure, StoreError, StoreResult, WriteFailure};
use crate::model::note::{Note, NoteId};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// On-disk record shape. Older documents carry neither `id` nor `timestamp`.
#[derive(Deserialize)]
struct StoredNote {
    #[serde(default)]
    id: Option<NoteId>,
    heading: String,
    content: String,
    #[serde(default)]
    timestamp: i64,
}

/// Note store backed by a single `notes.json`-style file.
#[derive(Debug, Clone)]
pub struct JsonFileNoteStore {
    path: PathBuf,
}

impl JsonFileNoteStore {
    /// Creates a store for `path`. No I/O happens until `load`/`save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Document location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, reason: ReadFailure) -> StoreError {
        StoreError::Read {
            path: self.path.clone(),
            reason,
        }
    }

    fn write_error(&self, reason: WriteFailure) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            reason,
        }
    }

    fn write_atomically(&self, bytes: &[u8]) -> StoreResult<()> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|err| self.write_error(WriteFailure::Io(err)))?;

        let mut temp = NamedTempFile::new_in(&parent)
            .map_err(|err| self.write_error(WriteFailure::Io(err)))?;
        temp.write_all(bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|err| self.write_error(WriteFailure::Io(err)))?;
        // Dropping the returned temp file on failure removes it.
        temp.persist(&self.path)
            .map_err(|err| self.write_error(WriteFailure::Io(err.error)))?;
        Ok(())
    }
}

impl NoteStore for JsonFileNoteStore {
    fn load(&self) -> StoreResult<Vec<Note>> {
        let started_at = Instant::now();
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("event=notes_load module=store status=ok source=missing count=0");
                return Ok(Vec::new());
            }
            Err(err) => {
                error!(
                    "event=notes_load module=store status=error error_code=store_read_io error={}",
                    err
                );
                return Err(self.read_error(ReadFailure::Io(err)));
            }
        };

        let stored: Vec<StoredNote> = serde_json::from_slice(&raw).map_err(|err| {
            error!(
                "event=notes_load module=store status=error error_code=store_read_malformed bytes={} line={} column={}",
                raw.len(),
                err.line(),
                err.column()
            );
            self.read_error(ReadFailure::Malformed(err))
        })?;

        let mut assigned = 0usize;
        let notes = stored
            .into_iter()
            .map(|record| {
                let id = record.id.unwrap_or_else(|| {
                    assigned += 1;
                    Uuid::new_v4()
                });
                Note::with_id(id, record.heading, record.content, record.timestamp)
            })
            .collect::<Vec<_>>();

        let mut seen = HashSet::with_capacity(notes.len());
        if let Some(duplicate) = notes.iter().find(|note| !seen.insert(note.id)) {
            error!(
                "event=notes_load module=store status=error error_code=store_read_duplicate_id note_id={}",
                duplicate.id
            );
            return Err(self.read_error(ReadFailure::DuplicateId(duplicate.id)));
        }

        if assigned > 0 {
            // Persist the new ids so the next load hands out the same ones.
            match self.save(&notes) {
                Ok(()) => info!(
                    "event=notes_migrate module=store status=ok assigned_ids={}",
                    assigned
                ),
                Err(err) => warn!(
                    "event=notes_migrate module=store status=error error_code={} assigned_ids={}",
                    err.code(),
                    assigned
                ),
            }
        }

        info!(
            "event=notes_load module=store status=ok count={} duration_ms={}",
            notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(notes)
    }

    fn save(&self, notes: &[Note]) -> StoreResult<()> {
        let started_at = Instant::now();
        let bytes = serde_json::to_vec_pretty(notes)
            .map_err(|err| self.write_error(WriteFailure::Encode(err)))?;

        match self.write_atomically(&bytes) {
            Ok(()) => {
                info!(
                    "event=notes_save module=store status=ok count={} bytes={} duration_ms={}",
                    notes.len(),
                    bytes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=notes_save module=store status=error error_code={} duration_ms={} error={}",
                    err.code(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileNoteStore;
    use crate::model::note::Note;
    use crate::store::{NoteStore, ReadFailure, StoreError};
    use std::fs;
    use uuid::Uuid;

    #[test]
    fn load_of_missing_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileNoteStore::new(dir.path().join("notes.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn load_rejects_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, b"{ not json").unwrap();

        let err = JsonFileNoteStore::new(&path).load().unwrap_err();
        assert!(err.is_read());
        assert_eq!(err.code(), "store_read_malformed");
        // The corrupted document must survive the failed read.
        assert_eq!(fs::read(&path).unwrap(), b"{ not json");
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let id = Uuid::new_v4();
        let doc = format!(
            r#"[{{"id":"{id}","heading":"a","content":"","timestamp":1}},
                {{"id":"{id}","heading":"b","content":"","timestamp":2}}]"#
        );
        fs::write(&path, doc).unwrap();

        match JsonFileNoteStore::new(&path).load() {
            Err(StoreError::Read {
                reason: ReadFailure::DuplicateId(dup),
                ..
            }) => assert_eq!(dup, id),
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn legacy_records_keep_their_assigned_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, r#"[{"heading":"Milk","content":"buy milk"}]"#).unwrap();
        let store = JsonFileNoteStore::new(&path);

        let first = store.load().unwrap();
        let second = store.load().unwrap();

        assert_eq!(first, second);
        let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json[0]["id"], first[0].id.to_string());
        assert_eq!(json[0]["timestamp"], 0);
    }

    #[test]
    fn documents_with_ids_are_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let doc = format!(
            r#"[{{"id":"{}","heading":"a","content":""}}]"#,
            Uuid::new_v4()
        );
        fs::write(&path, &doc).unwrap();

        JsonFileNoteStore::new(&path).load().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), doc);
    }

    #[test]
    fn save_creates_parent_directory_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");
        let store = JsonFileNoteStore::new(data_dir.join("notes.json"));

        store.save(&[Note::new("Milk", "buy milk")]).unwrap();

        let entries = fs::read_dir(&data_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect::<Vec<_>>();
        assert_eq!(entries, vec![std::ffi::OsString::from("notes.json")]);
    }

    #[test]
    fn save_overwrites_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileNoteStore::new(dir.path().join("notes.json"));
        store.save(&[Note::new("one", ""), Note::new("two", "")]).unwrap();
        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_into_unwritable_location_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();
        let store = JsonFileNoteStore::new(blocker.join("notes.json"));

        let err = store.save(&[Note::new("x", "y")]).unwrap_err();
        assert!(!err.is_read());
        assert_eq!(err.code(), "store_write_io");
    }
}
