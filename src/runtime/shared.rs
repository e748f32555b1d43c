//! Lock-guarded scheduler handle for callers that run passes off-thread.
//!
//! One `parking_lot::Mutex` serializes every scheduler operation, so a pass
//! running on a worker thread holds the lock for its whole duration and
//! `enqueue`/`clear` from the caller wait until it finishes. The
//! cancellation token lives outside the lock, which lets the caller interrupt
//! the executing process while the pass is in flight.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::debug;

use crate::core::{
    CancellationToken, Process, ProcessFactory, RunSummary, Scheduler, SchedulerError,
    SchedulerStats,
};

/// Clonable, thread-safe handle to a [`Scheduler`].
#[derive(Clone)]
pub struct SharedScheduler {
    inner: Arc<Mutex<Scheduler>>,
    cancel: CancellationToken,
    factory: ProcessFactory,
}

impl SharedScheduler {
    /// Wrap `scheduler`.
    pub fn new(scheduler: Scheduler) -> Self {
        let cancel = scheduler.cancellation_token();
        let factory = scheduler.factory().clone();
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
            cancel,
            factory,
        }
    }

    /// Process factory; usable without taking the lock.
    pub const fn factory(&self) -> &ProcessFactory {
        &self.factory
    }

    /// Interrupt the process currently executing, if any.
    ///
    /// The request is only delivered to a process that is running or about
    /// to run within the current pass:
    ///
    /// - Issued before the pass takes the lock (including right after
    ///   [`SharedScheduler::spawn_run_all`] returns), it is discarded when the
    ///   pass starts and every process runs normally.
    /// - Issued after one process finished its last step but before the next
    ///   one started, it interrupts the next process before its first step.
    ///
    /// Use [`SharedScheduler::is_busy`] or the audit stream to tell whether a
    /// pass is in flight.
    pub fn cancel_current(&self) {
        self.cancel.cancel();
    }

    /// Cancellation handle shared with the scheduler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether an operation (typically a pass) currently holds the lock.
    pub fn is_busy(&self) -> bool {
        self.inner.is_locked()
    }

    /// See [`Scheduler::enqueue`].
    pub fn enqueue(&self, process: Option<Process>) -> bool {
        self.inner.lock().enqueue(process)
    }

    /// See [`Scheduler::run_all`]. Blocks until the pass completes.
    pub fn run_all(&self) -> Option<RunSummary> {
        self.inner.lock().run_all()
    }

    /// See [`Scheduler::list_snapshot`].
    pub fn list_snapshot(&self) -> Vec<Process> {
        self.inner.lock().list_snapshot()
    }

    /// See [`Scheduler::stats`].
    pub fn stats(&self) -> SchedulerStats {
        self.inner.lock().stats()
    }

    /// See [`Scheduler::size`].
    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    /// See [`Scheduler::run_count`].
    pub fn run_count(&self) -> u64 {
        self.inner.lock().run_count()
    }

    /// See [`Scheduler::clear`].
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// See [`Scheduler::finalize`].
    pub fn finalize(&self) {
        self.inner.lock().finalize();
    }

    /// Run `f` with exclusive access to the scheduler.
    pub fn with_scheduler<R>(&self, f: impl FnOnce(&mut Scheduler) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Start a pass on a dedicated OS thread.
    pub fn spawn_run_all(&self) -> Result<RunHandle, SchedulerError> {
        let shared = self.clone();
        let handle = thread::Builder::new()
            .name("process-sim-run".into())
            .spawn(move || shared.run_all())
            .map_err(|e| SchedulerError::Worker(format!("failed to spawn run thread: {e}")))?;
        debug!("pass spawned on worker thread");
        Ok(RunHandle { handle })
    }
}

impl std::fmt::Debug for SharedScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedScheduler")
            .field("busy", &self.is_busy())
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

/// Handle to a pass running on a worker thread.
#[derive(Debug)]
pub struct RunHandle {
    handle: JoinHandle<Option<RunSummary>>,
}

impl RunHandle {
    /// Whether the pass has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the pass. `Ok(None)` means the queue was empty.
    pub fn join(self) -> Result<Option<RunSummary>, SchedulerError> {
        self.handle
            .join()
            .map_err(|_| SchedulerError::Worker("run thread panicked".into()))
    }
}
