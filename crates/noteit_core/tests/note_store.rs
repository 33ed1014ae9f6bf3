use noteit_core::{JsonFileNoteStore, Note, NoteStore, ReadFailure, StoreError};
use std::fs;
use uuid::Uuid;

#[test]
fn saved_notes_load_back_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileNoteStore::new(dir.path().join("notes.json"));
    let notes = vec![
        Note::new("Milk", "buy milk"),
        Note::new("", ""),
        Note::new("Unicode", "caf\u{e9} \u{1f4dd}\nsecond line"),
        Note::new("Work", "finish report"),
    ];

    store.save(&notes).unwrap();
    assert_eq!(store.load().unwrap(), notes);
}

#[test]
fn fresh_install_loads_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileNoteStore::new(dir.path().join("never-written").join("notes.json"));
    assert_eq!(store.load().unwrap(), Vec::<Note>::new());
}

#[test]
fn document_is_a_json_array_with_expected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let note = Note::with_id(id, "Milk", "buy milk", 1_700_000_000_000);

    JsonFileNoteStore::new(&path).save(&[note]).unwrap();

    let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id.to_string());
    assert_eq!(items[0]["heading"], "Milk");
    assert_eq!(items[0]["content"], "buy milk");
    assert_eq!(items[0]["timestamp"], 1_700_000_000_000_i64);
}

#[test]
fn legacy_documents_without_ids_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    fs::write(
        &path,
        r#"[{"heading":"Milk","content":"buy milk"},{"heading":"Milk","content":"buy milk"}]"#,
    )
    .unwrap();

    let store = JsonFileNoteStore::new(&path);
    let notes = store.load().unwrap();
    assert_eq!(notes.len(), 2);
    assert_ne!(notes[0].id, notes[1].id);
    assert_eq!(notes[0].timestamp, 0);
    assert_eq!(store.load().unwrap(), notes);
}

#[test]
fn missing_heading_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    fs::write(&path, r#"[{"content":"orphan"}]"#).unwrap();

    match JsonFileNoteStore::new(&path).load() {
        Err(StoreError::Read {
            reason: ReadFailure::Malformed(_),
            path: reported,
        }) => assert_eq!(reported, path),
        other => panic!("expected malformed read error, got {other:?}"),
    }
}

#[test]
fn null_document_is_malformed_not_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    fs::write(&path, "null").unwrap();

    let err = JsonFileNoteStore::new(&path).load().unwrap_err();
    assert!(err.is_read());
}
