//! Execution trail sinks.
//!
//! Each executing process narrates its steps as [`AuditEvent`]s. The scheduler
//! forwards them to an optional sink: a bounded in-memory buffer for tests and
//! status screens, or a channel for observers following a pass live.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::identity::ProcessId;
use crate::core::process::ProcessKind;
use crate::util::clock::now_ms;

/// What happened to a process during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Execution began.
    Started {
        /// Steps the process intends to run.
        planned_steps: u32,
    },
    /// A timed step finished.
    Step {
        /// One-based step index.
        index: u32,
        /// Planned step count.
        total: u32,
        /// Simulated units waited for this step.
        units: u64,
    },
    /// All planned steps ran.
    Completed {
        /// Steps run.
        steps: u32,
    },
    /// Cancellation stopped the process early.
    Interrupted {
        /// Steps finished before cancellation.
        completed_steps: u32,
        /// Steps originally planned.
        planned_steps: u32,
    },
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Pass the event belongs to.
    pub run_id: Uuid,
    /// Process the event describes.
    pub pid: ProcessId,
    /// Kind of that process.
    pub kind: ProcessKind,
    /// Action taken.
    pub action: AuditAction,
    /// Human-readable narration, e.g. `accessing disk`.
    pub detail: Option<String>,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

impl AuditEvent {
    /// Build an event stamped with the current wall-clock time.
    pub fn new(
        run_id: Uuid,
        pid: ProcessId,
        kind: ProcessKind,
        action: AuditAction,
        detail: Option<String>,
    ) -> Self {
        Self {
            run_id,
            pid,
            kind,
            action,
            detail,
            created_at_ms: now_ms(),
        }
    }
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Lets a caller keep a handle on a sink the scheduler also writes to.
impl<S: AuditSink> AuditSink for Arc<Mutex<S>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}

/// In-memory audit sink with a bounded buffer; the oldest events are dropped first.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }

    /// Drop every stored event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that forwards events to a channel receiver.
///
/// Events are dropped silently once the receiver disconnects.
#[cfg(not(target_arch = "wasm32"))]
pub struct ChannelAuditSink {
    tx: crossbeam_channel::Sender<AuditEvent>,
}

#[cfg(not(target_arch = "wasm32"))]
impl ChannelAuditSink {
    /// Create a sink and the receiver that observes it.
    pub fn unbounded() -> (Self, crossbeam_channel::Receiver<AuditEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AuditSink for ChannelAuditSink {
    fn record(&mut self, event: AuditEvent) {
        let _ = self.tx.send(event);
    }
}
