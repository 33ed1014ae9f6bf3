//! Note list controller.
//!
//! # Responsibility
//! - Own the full note list, the current query and the derived visible list.
//! - Route presentation intents into store operations on the storage worker.
//! - Notify the presentation layer after every visible-list change.
//!
//! # Invariants
//! - All state changes happen on the thread that owns the controller; the
//!   worker only sends completion messages back.
//! - `visible_list == NoteFilter::new(query).apply(full_list)` after every
//!   public call returns.
//! - Only the most recently requested load is applied; older load
//!   completions are dropped.
//! - A failed load never leads to a save, so a corrupted document is not
//!   overwritten by an empty list.

use crate::model::note::{Note, NoteId};
use crate::search::filter::NoteFilter;
use crate::store::{NoteStore, StoreError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

mod worker;

pub use worker::CancellationToken;
use worker::{Completion, Job, StorageWorker};

/// Presentation layer callbacks.
pub trait NoteListView {
    /// Called with the fresh visible list after every change.
    fn render(&mut self, visible: &[Note], is_empty: bool);
    /// Non-fatal problem to surface to the user.
    fn warn(&mut self, warning: &ListWarning);
    /// Opens the editing screen for `note`, or for a new note on `None`.
    fn open_editor(&mut self, note: Option<&Note>);
}

/// User intents emitted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    QueryChanged(String),
    NoteTapped(Note),
    DeleteTapped(Note),
    AddTapped,
    /// The list regained focus, typically after the editor closed.
    Resumed,
}

/// Non-fatal condition reported to the presentation layer.
#[derive(Debug)]
pub enum ListWarning {
    /// Notes could not be loaded; the list shows as empty.
    LoadFailed(StoreError),
    /// A delete is visible but not yet persisted; retried on the next save.
    SaveFailed(StoreError),
    /// The storage worker is not running; nothing can be loaded or saved.
    WorkerUnavailable,
}

impl Display for ListWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFailed(err) => write!(f, "could not load notes: {err}"),
            Self::SaveFailed(err) => write!(f, "could not save notes: {err}"),
            Self::WorkerUnavailable => write!(f, "note storage is unavailable"),
        }
    }
}

impl Error for ListWarning {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LoadFailed(err) | Self::SaveFailed(err) => Some(err),
            Self::WorkerUnavailable => None,
        }
    }
}

struct PendingLoad {
    generation: u64,
    reset_query: bool,
    /// Deletes accepted while this load was in flight.
    deleted: Vec<NoteId>,
}

/// Load / filter / mutate / persist lifecycle of the note list screen.
pub struct NoteListController<V: NoteListView> {
    view: V,
    worker: StorageWorker,
    token: CancellationToken,
    full_list: Vec<Note>,
    filter: NoteFilter,
    visible_list: Vec<Note>,
    next_generation: u64,
    pending_load: Option<PendingLoad>,
    jobs_in_flight: usize,
    unsaved_changes: bool,
    /// Set while the list reflects a failed load; no save may run.
    load_failed: bool,
}

impl<V: NoteListView> NoteListController<V> {
    /// Creates a controller and starts its storage worker. Nothing is loaded
    /// until `initialize`.
    pub fn new<S: NoteStore + 'static>(store: S, view: V) -> Self {
        let token = CancellationToken::new();
        Self {
            view,
            worker: StorageWorker::spawn(store, token.clone()),
            token,
            full_list: Vec::new(),
            filter: NoteFilter::default(),
            visible_list: Vec::new(),
            next_generation: 0,
            pending_load: None,
            jobs_in_flight: 0,
            unsaved_changes: false,
            load_failed: false,
        }
    }

    /// Starts an asynchronous load. On completion the query is cleared.
    pub fn initialize(&mut self) {
        self.request_load(true);
    }

    /// Re-reads storage so notes written by the editor become visible.
    ///
    /// Unlike `initialize`, the current query survives the reload: a search
    /// typed before opening the editor still applies to the fresh list.
    pub fn notify_returned_from_editor(&mut self) {
        self.request_load(false);
    }

    /// Trims `raw_query`, refilters synchronously and notifies.
    pub fn set_query(&mut self, raw_query: &str) {
        self.filter = NoteFilter::new(raw_query);
        debug!(
            "event=query_set module=controller status=ok query_len={} match_all={}",
            self.filter.query().chars().count(),
            self.filter.matches_all()
        );
        self.publish();
    }

    /// Removes the note with `note.id`, persists in the background and
    /// notifies without waiting for the save.
    ///
    /// Deleting a note that is not in the list changes nothing. It only
    /// saves when an earlier save failed, as a retry.
    pub fn delete(&mut self, note: &Note) {
        let Some(position) = self.full_list.iter().position(|n| n.id == note.id) else {
            debug!(
                "event=note_delete module=controller status=skip reason=absent note_id={}",
                note.id
            );
            if self.unsaved_changes && self.pending_load.is_none() {
                self.request_save();
            }
            return;
        };

        self.full_list.remove(position);
        info!(
            "event=note_delete module=controller status=ok note_id={} remaining={}",
            note.id,
            self.full_list.len()
        );

        match self.pending_load.as_mut() {
            // Saved once the in-flight load lands, minus this id.
            Some(pending) => pending.deleted.push(note.id),
            None => self.request_save(),
        }
        self.publish();
    }

    /// Routes one presentation intent.
    pub fn dispatch(&mut self, intent: ListIntent) {
        match intent {
            ListIntent::QueryChanged(text) => self.set_query(&text),
            ListIntent::NoteTapped(note) => self.open_note(&note),
            ListIntent::DeleteTapped(note) => self.delete(&note),
            ListIntent::AddTapped => {
                info!("event=editor_open module=controller status=ok mode=create");
                self.view.open_editor(None);
            }
            ListIntent::Resumed => self.notify_returned_from_editor(),
        }
    }

    /// Applies every completion that has already arrived. Never blocks.
    ///
    /// Returns the number of completions handled.
    pub fn process_completions(&mut self) -> usize {
        let mut handled = 0;
        while let Some(completion) = self.worker.try_next() {
            self.apply(completion);
            handled += 1;
        }
        handled
    }

    /// Blocks until no storage job is in flight or `timeout` passes.
    ///
    /// Returns `true` when idle.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.jobs_in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.worker.next_timeout(remaining) {
                Some(completion) => self.apply(completion),
                None => return false,
            }
        }
        true
    }

    /// Tears the controller down.
    ///
    /// Queued saves are flushed; every pending completion is dropped and the
    /// view receives no further calls.
    pub fn close(mut self) -> V {
        info!(
            "event=controller_close module=controller status=ok jobs_in_flight={}",
            self.jobs_in_flight
        );
        self.worker.close();
        self.view
    }

    pub fn full_list(&self) -> &[Note] {
        &self.full_list
    }

    pub fn visible_list(&self) -> &[Note] {
        &self.visible_list
    }

    pub fn query(&self) -> &str {
        self.filter.query()
    }

    /// Empty-state signal: true iff the visible list is empty.
    pub fn is_empty(&self) -> bool {
        self.visible_list.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Whether the last save failed and neither a later save nor a load
    /// has settled the list since.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// Token tripped when the controller is torn down.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn open_note(&mut self, note: &Note) {
        match self.full_list.iter().find(|n| n.id == note.id) {
            Some(current) => {
                info!(
                    "event=editor_open module=controller status=ok mode=edit note_id={}",
                    current.id
                );
                self.view.open_editor(Some(current));
            }
            None => debug!(
                "event=editor_open module=controller status=skip reason=absent note_id={}",
                note.id
            ),
        }
    }

    fn request_load(&mut self, reset_query: bool) {
        self.next_generation += 1;
        let generation = self.next_generation;
        if !self.submit(Job::Load { generation }) {
            return;
        }

        // A newer load supersedes an older one but inherits its deletes.
        let (reset_query, deleted) = match self.pending_load.take() {
            Some(previous) => (reset_query || previous.reset_query, previous.deleted),
            None => (reset_query, Vec::new()),
        };
        self.pending_load = Some(PendingLoad {
            generation,
            reset_query,
            deleted,
        });
        debug!(
            "event=load_request module=controller status=start generation={}",
            generation
        );
    }

    fn request_save(&mut self) {
        if self.load_failed {
            debug!("event=save_request module=controller status=skip reason=load_failed");
            return;
        }
        self.submit(Job::Save {
            notes: self.full_list.clone(),
        });
    }

    fn submit(&mut self, job: Job) -> bool {
        if self.worker.submit(job) {
            self.jobs_in_flight += 1;
            return true;
        }
        error!("event=job_submit module=controller status=error error_code=worker_unavailable");
        self.view.warn(&ListWarning::WorkerUnavailable);
        false
    }

    fn apply(&mut self, completion: Completion) {
        self.jobs_in_flight = self.jobs_in_flight.saturating_sub(1);
        if self.token.is_cancelled() {
            debug!("event=completion_apply module=controller status=skip reason=cancelled");
            return;
        }

        match completion {
            Completion::Loaded { generation, result } => self.apply_load(generation, result),
            Completion::Saved { count, result } => match result {
                Ok(()) => {
                    debug!(
                        "event=save_complete module=controller status=ok count={}",
                        count
                    );
                    self.unsaved_changes = false;
                }
                Err(err) => {
                    warn!(
                        "event=save_complete module=controller status=error error_code={}",
                        err.code()
                    );
                    self.unsaved_changes = true;
                    self.view.warn(&ListWarning::SaveFailed(err));
                }
            },
        }
    }

    fn apply_load(&mut self, generation: u64, result: Result<Vec<Note>, StoreError>) {
        let is_current = self
            .pending_load
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);
        if !is_current {
            debug!(
                "event=load_complete module=controller status=skip reason=superseded generation={}",
                generation
            );
            return;
        }
        let Some(pending) = self.pending_load.take() else {
            return;
        };

        if pending.reset_query {
            self.filter = NoteFilter::default();
        }

        match result {
            Ok(mut notes) => {
                let loaded = notes.len();
                notes.retain(|note| !pending.deleted.contains(&note.id));
                let replayed = loaded - notes.len();
                self.full_list = notes;
                self.unsaved_changes = false;
                self.load_failed = false;
                info!(
                    "event=load_complete module=controller status=ok generation={} count={} replayed_deletes={}",
                    generation,
                    self.full_list.len(),
                    replayed
                );
                if replayed > 0 {
                    self.request_save();
                }
            }
            Err(err) => {
                error!(
                    "event=load_complete module=controller status=error generation={} error_code={}",
                    generation,
                    err.code()
                );
                self.full_list.clear();
                // The empty list stands for nothing on disk; never persist it.
                self.unsaved_changes = false;
                self.load_failed = true;
                self.view.warn(&ListWarning::LoadFailed(err));
            }
        }
        self.publish();
    }

    fn publish(&mut self) {
        self.visible_list = self.filter.apply(&self.full_list);
        self.view
            .render(&self.visible_list, self.visible_list.is_empty());
    }
}

#[cfg(test)]
mod tests;
