//! Process identity allocation.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// First PID handed out by a default generator.
pub const FIRST_PID: u64 = 1000;

/// Largest first PID a configuration may request.
pub const MAX_FIRST_PID: u64 = u64::MAX / 2;

/// Identity of a simulated process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(u64);

impl ProcessId {
    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential PID source.
///
/// Every call to [`IdGenerator::next_id`] returns a value strictly greater than
/// the previous one. Values are never reused and the sequence is never rewound,
/// so clearing a scheduler queue does not recycle identities.
///
/// The counter never wraps. Once `u64::MAX` has been handed out the space is
/// exhausted: [`IdGenerator::try_next_id`] returns `None` and
/// [`IdGenerator::next_id`] keeps returning `u64::MAX` with a warning.
/// Configurations are limited to [`MAX_FIRST_PID`] so this is unreachable
/// through [`crate::config::SimulationConfig`].
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
    exhausted: AtomicBool,
}

impl IdGenerator {
    /// Create a generator whose first identity is `first`.
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
            exhausted: AtomicBool::new(false),
        }
    }

    /// Allocate the next identity, or `None` once the space is exhausted.
    pub fn try_next_id(&self) -> Option<ProcessId> {
        match self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
        {
            Ok(id) => Some(ProcessId(id)),
            Err(last) if !self.exhausted.swap(true, Ordering::Relaxed) => Some(ProcessId(last)),
            Err(_) => None,
        }
    }

    /// Allocate the next identity; saturates at `u64::MAX` instead of wrapping.
    pub fn next_id(&self) -> ProcessId {
        self.try_next_id().unwrap_or_else(|| {
            warn!("process identity space exhausted");
            ProcessId(u64::MAX)
        })
    }

    /// Whether `u64::MAX` has already been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Relaxed)
    }

    /// Identity the next call to `next_id` will return.
    pub fn peek(&self) -> ProcessId {
        ProcessId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::starting_at(FIRST_PID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_generator_starts_at_first_pid() {
        let ids = IdGenerator::default();
        assert_eq!(ids.next_id().get(), 1000);
        assert_eq!(ids.next_id().get(), 1001);
        assert_eq!(ids.peek().get(), 1002);
    }

    #[test]
    fn test_generator_unique_across_threads() {
        let ids = Arc::new(IdGenerator::starting_at(1));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<ProcessId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 1000);
    }

    #[test]
    fn test_generator_does_not_wrap_at_end_of_space() {
        let ids = IdGenerator::starting_at(u64::MAX - 1);
        assert_eq!(ids.try_next_id().map(ProcessId::get), Some(u64::MAX - 1));
        assert!(!ids.is_exhausted());
        assert_eq!(ids.try_next_id().map(ProcessId::get), Some(u64::MAX));
        assert!(ids.is_exhausted());
        assert_eq!(ids.try_next_id(), None);
        assert_eq!(ids.next_id().get(), u64::MAX);
    }

    #[test]
    fn test_generator_starting_at_max_hands_out_max_once() {
        let ids = IdGenerator::starting_at(u64::MAX);
        let first = ids.try_next_id();
        assert_eq!(first.map(ProcessId::get), Some(u64::MAX));
        assert_eq!(ids.try_next_id(), None);
        assert!(ids.next_id() >= first.unwrap_or(ProcessId(0)));
    }
}
