//! Cooperative cancellation and injectable step delays.
//!
//! Process execution never calls `thread::sleep` directly. Every timed step
//! goes through a [`Delay`], which receives the [`CancellationToken`] for the
//! run and must return early once cancellation is requested. Tests swap in
//! [`InstantDelay`] or [`VirtualClock`] to skip real waiting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Result of a single timed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full delay elapsed.
    Elapsed,
    /// Cancellation was observed before the delay finished.
    Cancelled,
}

struct CancelState {
    requested: Mutex<bool>,
    condvar: Condvar,
}

/// Clonable handle used to interrupt the process that is currently executing.
///
/// A request is consumed by the first process that observes it, the same way
/// a thread interrupt is cleared once delivered. Later processes in the same
/// pass therefore run normally.
#[derive(Clone)]
pub struct CancellationToken {
    state: Arc<CancelState>,
}

impl CancellationToken {
    /// Create a token with no pending request.
    pub fn new() -> Self {
        Self {
            state: Arc::new(CancelState {
                requested: Mutex::new(false),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Request cancellation and wake any waiter.
    pub fn cancel(&self) {
        let mut requested = self.state.requested.lock();
        *requested = true;
        drop(requested);
        self.state.condvar.notify_all();
    }

    /// Whether a request is pending (does not consume it).
    pub fn is_cancelled(&self) -> bool {
        *self.state.requested.lock()
    }

    /// Consume a pending request. Returns `true` if one was pending.
    pub fn take(&self) -> bool {
        std::mem::take(&mut *self.state.requested.lock())
    }

    /// Block for up to `timeout`, returning early if cancellation is requested.
    ///
    /// Returns `true` (and consumes the request) when cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut requested = self.state.requested.lock();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                while !*requested {
                    if self
                        .state
                        .condvar
                        .wait_until(&mut requested, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
            }
            None => {
                while !*requested {
                    self.state.condvar.wait(&mut requested);
                }
            }
        }
        std::mem::take(&mut *requested)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Source of simulated step delays.
///
/// `units` is the simulated duration of one step. Implementations must observe
/// `cancel` and return [`WaitOutcome::Cancelled`] instead of finishing the wait
/// once a request is pending.
///
/// Any `Fn(u64, &CancellationToken) -> WaitOutcome` closure is a `Delay`.
pub trait Delay: Send + Sync {
    /// Wait for `units` simulated time units.
    fn wait(&self, units: u64, cancel: &CancellationToken) -> WaitOutcome;
}

impl<F> Delay for F
where
    F: Fn(u64, &CancellationToken) -> WaitOutcome + Send + Sync,
{
    fn wait(&self, units: u64, cancel: &CancellationToken) -> WaitOutcome {
        self(units, cancel)
    }
}

/// Real-time delay that blocks the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadDelay {
    unit_micros: u64,
}

impl ThreadDelay {
    /// One simulated unit lasts `unit_micros` microseconds.
    pub const fn new(unit_micros: u64) -> Self {
        Self { unit_micros }
    }

    /// One simulated unit lasts one millisecond.
    pub const fn millis() -> Self {
        Self::new(1_000)
    }

    /// Wall-clock length of `units`.
    pub const fn duration_of(&self, units: u64) -> Duration {
        Duration::from_micros(self.unit_micros.saturating_mul(units))
    }
}

impl Delay for ThreadDelay {
    fn wait(&self, units: u64, cancel: &CancellationToken) -> WaitOutcome {
        if cancel.wait_timeout(self.duration_of(units)) {
            WaitOutcome::Cancelled
        } else {
            WaitOutcome::Elapsed
        }
    }
}

/// Delay that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantDelay;

impl Delay for InstantDelay {
    fn wait(&self, _units: u64, cancel: &CancellationToken) -> WaitOutcome {
        if cancel.take() {
            WaitOutcome::Cancelled
        } else {
            WaitOutcome::Elapsed
        }
    }
}

/// Virtual clock that advances by the requested units without blocking.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: AtomicU64,
    waits: AtomicU64,
}

impl VirtualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total units advanced so far; saturates at `u64::MAX`.
    pub fn elapsed_units(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }

    /// Number of completed waits.
    pub fn wait_count(&self) -> u64 {
        self.waits.load(Ordering::Relaxed)
    }
}

impl Delay for VirtualClock {
    fn wait(&self, units: u64, cancel: &CancellationToken) -> WaitOutcome {
        if cancel.take() {
            return WaitOutcome::Cancelled;
        }
        let _ = self
            .now
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |now| {
                Some(now.saturating_add(units))
            });
        self.waits.fetch_add(1, Ordering::Relaxed);
        WaitOutcome::Elapsed
    }
}
