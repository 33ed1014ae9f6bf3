//! Background storage worker.
//!
//! # Responsibility
//! - Run note store I/O off the UI-bound thread, one job at a time.
//! - Hand results back as completion messages; never touch caller state.
//!
//! # Invariants
//! - Jobs execute in submission order on a single thread.
//! - After cancellation, queued loads are skipped and no completion is sent.
//! - Queued saves still run after cancellation so accepted deletes are kept.

use crate::model::note::Note;
use crate::store::{NoteStore, StoreResult};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Shared teardown flag checked before work starts and before results apply.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub(crate) enum Job {
    Load { generation: u64 },
    Save { notes: Vec<Note> },
}

/// Result of one finished job, delivered back to the owning thread.
#[derive(Debug)]
pub(crate) enum Completion {
    Loaded {
        generation: u64,
        result: StoreResult<Vec<Note>>,
    },
    Saved {
        count: usize,
        result: StoreResult<()>,
    },
}

/// Single background thread owning a `NoteStore`.
pub(crate) struct StorageWorker {
    jobs: Option<Sender<Job>>,
    completions: Receiver<Completion>,
    token: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl StorageWorker {
    pub(crate) fn spawn<S: NoteStore + 'static>(store: S, token: CancellationToken) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel::<Completion>();
        let worker_token = token.clone();
        let thread = thread::Builder::new()
            .name("noteit-storage".to_string())
            .spawn(move || run(store, job_rx, done_tx, worker_token))
            .ok();
        if thread.is_none() {
            warn!("event=worker_spawn module=worker status=error");
        }

        Self {
            jobs: Some(job_tx),
            completions: done_rx,
            token,
            thread,
        }
    }

    /// Queues a job. Returns `false` when the worker is gone.
    pub(crate) fn submit(&self, job: Job) -> bool {
        match &self.jobs {
            Some(jobs) => jobs.send(job).is_ok(),
            None => false,
        }
    }

    pub(crate) fn try_next(&self) -> Option<Completion> {
        match self.completions.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub(crate) fn next_timeout(&self, timeout: Duration) -> Option<Completion> {
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Cancels, closes the queue and waits for already queued saves.
    pub(crate) fn close(&mut self) {
        self.token.cancel();
        self.jobs.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("event=worker_close module=worker status=error reason=panicked");
            }
        }
    }
}

impl Drop for StorageWorker {
    fn drop(&mut self) {
        // Detach: pending saves finish in the background, completions are dropped.
        self.token.cancel();
        self.jobs.take();
    }
}

fn run<S: NoteStore>(
    store: S,
    jobs: Receiver<Job>,
    completions: Sender<Completion>,
    token: CancellationToken,
) {
    debug!("event=worker_start module=worker status=ok");
    for job in jobs {
        let completion = match job {
            Job::Load { generation } => {
                if token.is_cancelled() {
                    debug!(
                        "event=worker_job module=worker status=skip job=load generation={}",
                        generation
                    );
                    continue;
                }
                Completion::Loaded {
                    generation,
                    result: store.load(),
                }
            }
            Job::Save { notes } => Completion::Saved {
                count: notes.len(),
                result: store.save(&notes),
            },
        };

        if token.is_cancelled() {
            continue;
        }
        if completions.send(completion).is_err() {
            debug!("event=worker_job module=worker status=skip reason=receiver_gone");
        }
    }
    debug!("event=worker_stop module=worker status=ok");
}
