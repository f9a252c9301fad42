//! Worker spawning and cancellation plumbing.
//!
//! Each operation runs on its own thread, single-threaded internally, and
//! talks to the caller only through the channel in its handle. No state is
//! shared beyond the cancel flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Shared cancellation flag, checked between units of work (per file, per
/// directory). Cancellation is cooperative, never preemptive.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Handle to one spawned worker: its message stream, cancel token and join
/// handle. Dropping the handle cancels the worker and waits for it to
/// unwind, so no file handles or partial state outlive the handle.
pub struct WorkerHandle<M> {
    receiver: Receiver<M>,
    cancel: CancelToken,
    join: Option<JoinHandle<()>>,
}

impl<M> WorkerHandle<M> {
    pub fn receiver(&self) -> &Receiver<M> {
        &self.receiver
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the worker thread to finish.
    pub fn join(mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl<M> Drop for WorkerHandle<M> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawn a worker thread running `body` with a fresh channel and cancel
/// token. The body owns the sending side; the channel closes when it
/// returns.
pub fn spawn<M, F>(body: F) -> WorkerHandle<M>
where
    M: Send + 'static,
    F: FnOnce(Sender<M>, CancelToken) + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let join = thread::spawn(move || body(tx, worker_cancel));

    WorkerHandle {
        receiver: rx,
        cancel,
        join: Some(join),
    }
}
