use super::{ListIntent, ListWarning, NoteListController, NoteListView};
use crate::model::note::Note;
use crate::store::{NoteStore, ReadFailure, StoreError, StoreResult, WriteFailure};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct RecordingView {
    renders: Vec<(Vec<String>, bool)>,
    warnings: Vec<String>,
    opened: Vec<Option<Note>>,
}

impl NoteListView for RecordingView {
    fn render(&mut self, visible: &[Note], is_empty: bool) {
        let headings = visible.iter().map(|n| n.heading.clone()).collect();
        self.renders.push((headings, is_empty));
    }

    fn warn(&mut self, warning: &ListWarning) {
        self.warnings.push(warning.to_string());
    }

    fn open_editor(&mut self, note: Option<&Note>) {
        self.opened.push(note.cloned());
    }
}

/// In-memory store recording every save, with switchable save failures.
#[derive(Default)]
struct SharedStore {
    notes: Mutex<Vec<Note>>,
    saves: Mutex<Vec<Vec<Note>>>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
}

impl SharedStore {
    fn with_notes(notes: Vec<Note>) -> Arc<Self> {
        Arc::new(Self {
            notes: Mutex::new(notes),
            ..Self::default()
        })
    }

    fn saves(&self) -> Vec<Vec<Note>> {
        self.saves.lock().unwrap().clone()
    }
}

impl NoteStore for SharedStore {
    fn load(&self) -> StoreResult<Vec<Note>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Read {
                path: PathBuf::from("memory"),
                reason: ReadFailure::Io(io::Error::other("device unplugged")),
            });
        }
        Ok(self.notes.lock().unwrap().clone())
    }

    fn save(&self, notes: &[Note]) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                path: PathBuf::from("memory"),
                reason: WriteFailure::Io(io::Error::other("disk full")),
            });
        }
        *self.notes.lock().unwrap() = notes.to_vec();
        self.saves.lock().unwrap().push(notes.to_vec());
        Ok(())
    }
}

fn milk_and_work() -> Vec<Note> {
    vec![Note::new("Milk", "buy milk"), Note::new("Work", "finish report")]
}

fn loaded(store: Arc<SharedStore>) -> NoteListController<RecordingView> {
    let mut controller = NoteListController::new(store, RecordingView::default());
    controller.initialize();
    assert!(controller.wait_until_idle(WAIT));
    controller
}

fn headings(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|n| n.heading.as_str()).collect()
}

#[test]
fn initialize_publishes_loaded_notes() {
    let controller = loaded(SharedStore::with_notes(milk_and_work()));

    assert_eq!(headings(controller.full_list()), vec!["Milk", "Work"]);
    assert_eq!(controller.visible_list(), controller.full_list());
    assert!(!controller.is_loading());
    let last = controller.view().renders.last().unwrap();
    assert_eq!(last, &(vec!["Milk".to_string(), "Work".to_string()], false));
}

#[test]
fn state_is_untouched_until_completions_are_processed() {
    let store = SharedStore::with_notes(milk_and_work());
    let mut controller = NoteListController::new(store, RecordingView::default());
    controller.initialize();

    assert!(controller.is_loading());
    assert!(controller.full_list().is_empty());
    assert!(controller.view().renders.is_empty());

    assert!(controller.wait_until_idle(WAIT));
    assert_eq!(controller.full_list().len(), 2);
}

#[test]
fn query_filters_case_insensitively() {
    let mut controller = loaded(SharedStore::with_notes(milk_and_work()));
    controller.set_query("MILK");

    assert_eq!(headings(controller.visible_list()), vec!["Milk"]);
    assert_eq!(controller.full_list().len(), 2);
    assert!(!controller.is_empty());
}

#[test]
fn whitespace_query_shows_everything() {
    let mut controller = loaded(SharedStore::with_notes(milk_and_work()));
    controller.set_query("report");
    controller.set_query("   ");

    assert_eq!(controller.query(), "");
    assert_eq!(controller.visible_list().len(), 2);
}

#[test]
fn empty_signal_follows_visible_list_not_full_list() {
    let mut controller = loaded(SharedStore::with_notes(milk_and_work()));
    controller.set_query("zebra");

    assert!(controller.is_empty());
    assert_eq!(controller.full_list().len(), 2);
    assert_eq!(controller.view().renders.last().unwrap(), &(Vec::new(), true));
}

#[test]
fn delete_keeps_filter_and_persists() {
    let notes = vec![
        Note::new("Milk", "buy milk"),
        Note::new("Milkshake", "vanilla"),
        Note::new("Work", "finish report"),
    ];
    let first = notes[0].clone();
    let store = SharedStore::with_notes(notes);
    let mut controller = loaded(store.clone());

    controller.set_query("milk");
    controller.delete(&first);

    assert_eq!(headings(controller.visible_list()), vec!["Milkshake"]);
    assert_eq!(headings(controller.full_list()), vec!["Milkshake", "Work"]);
    assert!(controller.wait_until_idle(WAIT));
    let saves = store.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(headings(&saves[0]), vec!["Milkshake", "Work"]);
}

#[test]
fn delete_matches_by_id_not_content() {
    let twin_a = Note::new("same", "same");
    let twin_b = Note::new("same", "same");
    let store = SharedStore::with_notes(vec![twin_a.clone(), twin_b.clone()]);
    let mut controller = loaded(store);

    controller.delete(&twin_b);

    assert_eq!(controller.full_list(), &[twin_a]);
}

#[test]
fn deleting_absent_note_is_a_no_op_without_save() {
    let store = SharedStore::with_notes(milk_and_work());
    let mut controller = loaded(store.clone());
    let renders_before = controller.view().renders.len();

    controller.delete(&Note::new("ghost", ""));

    assert!(controller.wait_until_idle(WAIT));
    assert_eq!(controller.full_list().len(), 2);
    assert_eq!(controller.view().renders.len(), renders_before);
    assert!(store.saves().is_empty());
}

#[test]
fn deleting_only_note_saves_empty_array() {
    let only = Note::new("Solo", "");
    let store = SharedStore::with_notes(vec![only.clone()]);
    let mut controller = loaded(store.clone());

    controller.dispatch(ListIntent::DeleteTapped(only));

    assert!(controller.full_list().is_empty());
    assert!(controller.visible_list().is_empty());
    assert!(controller.is_empty());
    assert!(controller.wait_until_idle(WAIT));
    assert_eq!(store.saves(), vec![Vec::<Note>::new()]);
}

#[test]
fn failed_save_warns_keeps_deletion_and_retries_next_time() {
    let notes = milk_and_work();
    let (milk, work) = (notes[0].clone(), notes[1].clone());
    let store = SharedStore::with_notes(notes);
    let mut controller = loaded(store.clone());

    store.fail_saves.store(true, Ordering::SeqCst);
    controller.delete(&milk);
    assert!(controller.wait_until_idle(WAIT));

    assert_eq!(headings(controller.full_list()), vec!["Work"]);
    assert!(controller.has_unsaved_changes());
    assert_eq!(controller.view().warnings.len(), 1);
    assert!(controller.view().warnings[0].contains("could not save"));

    store.fail_saves.store(false, Ordering::SeqCst);
    controller.delete(&work);
    assert!(controller.wait_until_idle(WAIT));

    assert!(!controller.has_unsaved_changes());
    assert_eq!(store.saves(), vec![Vec::<Note>::new()]);
}

#[test]
fn no_op_delete_retries_failed_save() {
    let notes = milk_and_work();
    let milk = notes[0].clone();
    let store = SharedStore::with_notes(notes);
    let mut controller = loaded(store.clone());

    store.fail_saves.store(true, Ordering::SeqCst);
    controller.delete(&milk);
    assert!(controller.wait_until_idle(WAIT));
    store.fail_saves.store(false, Ordering::SeqCst);

    controller.delete(&milk);
    assert!(controller.wait_until_idle(WAIT));

    assert!(!controller.has_unsaved_changes());
    assert_eq!(headings(&store.saves()[0]), vec!["Work"]);
}

#[test]
fn failed_load_after_failed_save_never_persists_empty_list() {
    let notes = milk_and_work();
    let milk = notes[0].clone();
    let store = SharedStore::with_notes(notes);
    let mut controller = loaded(store.clone());

    store.fail_saves.store(true, Ordering::SeqCst);
    controller.delete(&milk);
    assert!(controller.wait_until_idle(WAIT));
    assert!(controller.has_unsaved_changes());

    store.fail_saves.store(false, Ordering::SeqCst);
    store.fail_loads.store(true, Ordering::SeqCst);
    controller.notify_returned_from_editor();
    assert!(controller.wait_until_idle(WAIT));
    assert!(controller.full_list().is_empty());
    assert!(!controller.has_unsaved_changes());

    controller.delete(&milk);
    assert!(controller.wait_until_idle(WAIT));

    assert!(store.saves().is_empty());
    assert_eq!(headings(&store.notes.lock().unwrap()), vec!["Milk", "Work"]);

    // A successful load lifts the block.
    store.fail_loads.store(false, Ordering::SeqCst);
    controller.notify_returned_from_editor();
    assert!(controller.wait_until_idle(WAIT));
    controller.delete(&milk);
    assert!(controller.wait_until_idle(WAIT));
    assert_eq!(headings(&store.saves()[0]), vec!["Work"]);
}

#[test]
fn resume_reloads_external_edits_and_keeps_query() {
    let store = SharedStore::with_notes(milk_and_work());
    let mut controller = loaded(store.clone());
    controller.set_query("milk");

    store
        .notes
        .lock()
        .unwrap()
        .push(Note::new("Milk run", "saturday"));
    controller.dispatch(ListIntent::Resumed);
    assert!(controller.wait_until_idle(WAIT));

    assert_eq!(controller.full_list().len(), 3);
    assert_eq!(controller.query(), "milk");
    assert_eq!(headings(controller.visible_list()), vec!["Milk", "Milk run"]);
}

#[test]
fn initialize_clears_query_on_completion() {
    let mut controller = loaded(SharedStore::with_notes(milk_and_work()));
    controller.set_query("work");

    controller.initialize();
    assert_eq!(controller.query(), "work");
    assert!(controller.wait_until_idle(WAIT));

    assert_eq!(controller.query(), "");
    assert_eq!(controller.visible_list().len(), 2);
}

#[test]
fn delete_during_load_is_replayed_on_loaded_list() {
    let notes = milk_and_work();
    let milk = notes[0].clone();
    let store = SharedStore::with_notes(notes);
    let mut controller = loaded(store.clone());

    store.notes.lock().unwrap().push(Note::new("Fresh", "from editor"));
    controller.notify_returned_from_editor();
    controller.delete(&milk);
    assert_eq!(headings(controller.visible_list()), vec!["Work"]);
    assert!(controller.wait_until_idle(WAIT));

    assert_eq!(headings(controller.full_list()), vec!["Work", "Fresh"]);
    let saves = store.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(headings(&saves[0]), vec!["Work", "Fresh"]);
}

#[test]
fn only_latest_load_is_applied() {
    let store = SharedStore::with_notes(milk_and_work());
    let mut controller = NoteListController::new(store, RecordingView::default());

    controller.initialize();
    controller.notify_returned_from_editor();
    assert!(controller.wait_until_idle(WAIT));

    // One render for the surviving load, none for the superseded one.
    assert_eq!(controller.view().renders.len(), 1);
    assert_eq!(controller.full_list().len(), 2);
}

#[test]
fn load_failure_degrades_to_empty_list_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(&path, b"[{\"heading\": 1}]").unwrap();
    let store = crate::store::JsonFileNoteStore::new(&path);
    let mut controller = NoteListController::new(store, RecordingView::default());

    controller.initialize();
    assert!(controller.wait_until_idle(WAIT));

    assert!(controller.full_list().is_empty());
    assert!(controller.is_empty());
    assert_eq!(controller.view().warnings.len(), 1);
    assert!(controller.view().warnings[0].contains("could not load"));
    assert_eq!(controller.view().renders.last().unwrap(), &(Vec::new(), true));
    // The unreadable document is left as it was.
    assert_eq!(std::fs::read(&path).unwrap(), b"[{\"heading\": 1}]");
}

#[test]
fn tap_and_add_open_the_editor() {
    let notes = milk_and_work();
    let work = notes[1].clone();
    let mut controller = loaded(SharedStore::with_notes(notes));

    controller.dispatch(ListIntent::NoteTapped(work.clone()));
    controller.dispatch(ListIntent::AddTapped);
    controller.dispatch(ListIntent::NoteTapped(Note::new("ghost", "")));

    assert_eq!(controller.view().opened, vec![Some(work), None]);
}

#[test]
fn cancelled_controller_drops_completions() {
    let store = SharedStore::with_notes(milk_and_work());
    let mut controller = NoteListController::new(store, RecordingView::default());

    controller.initialize();
    controller.cancellation_token().cancel();
    controller.wait_until_idle(Duration::from_millis(200));
    controller.process_completions();

    assert!(controller.full_list().is_empty());
    assert!(controller.view().renders.is_empty());
}

#[test]
fn close_flushes_pending_delete() {
    let notes = milk_and_work();
    let milk = notes[0].clone();
    let store = SharedStore::with_notes(notes);
    let mut controller = loaded(store.clone());

    controller.delete(&milk);
    let view = controller.close();

    assert!(view.warnings.is_empty());
    assert_eq!(headings(&store.saves()[0]), vec!["Work"]);
}
