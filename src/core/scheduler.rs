//! Single-queue scheduler.
//!
//! The scheduler owns an insertion-ordered queue of [`Process`]es. A pass
//! (`run_all`) executes every queued process exactly once, in queue order, one
//! at a time on the calling thread. Processes stay queued after a pass; only
//! `clear`/`finalize` empty the queue.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::builders::SchedulerBuilder;
use crate::core::audit::AuditSink;
use crate::core::delay::{CancellationToken, Delay};
use crate::core::factory::ProcessFactory;
use crate::core::process::{ExecutionContext, ExecutionReport, JitterRange, Process};

/// Result of one non-empty pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique id of the pass, also stamped on its audit events.
    pub run_id: Uuid,
    /// Value of the run counter after this pass.
    pub run_number: u64,
    /// One report per executed process, in queue order.
    pub reports: Vec<ExecutionReport>,
    /// Wall-clock time the pass took.
    pub wall_time: Duration,
}

impl RunSummary {
    /// Processes stopped early by cancellation.
    pub fn interrupted_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_completed()).count()
    }

    /// Simulated units waited across the pass (saturating).
    pub fn waited_units(&self) -> u64 {
        self.reports
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.waited_units))
    }
}

/// Point-in-time scheduler statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Processes currently queued.
    pub queued: usize,
    /// Completed passes since creation or the last clear.
    pub runs: u64,
    /// Floor of the mean estimated duration of queued processes.
    pub average_estimated_duration: u64,
    /// Sum of the estimated durations of queued processes.
    pub total_estimated_duration: u64,
}

/// Queue of simulated processes with run accounting.
pub struct Scheduler {
    queue: Vec<Process>,
    run_count: u64,
    factory: ProcessFactory,
    delay: Arc<dyn Delay>,
    cancel: CancellationToken,
    rng: StdRng,
    jitter: JitterRange,
    audit: Option<Box<dyn AuditSink>>,
}

impl Scheduler {
    /// Scheduler with default configuration: real-time waits of one
    /// millisecond per unit and an OS-seeded random source.
    pub fn new() -> Self {
        SchedulerBuilder::default().build_unchecked()
    }

    /// Builder for a customised scheduler.
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::default()
    }

    pub(crate) fn from_parts(
        factory: ProcessFactory,
        delay: Arc<dyn Delay>,
        cancel: CancellationToken,
        rng: StdRng,
        jitter: JitterRange,
        audit: Option<Box<dyn AuditSink>>,
    ) -> Self {
        Self {
            queue: Vec::new(),
            run_count: 0,
            factory,
            delay,
            cancel,
            rng,
            jitter,
            audit,
        }
    }

    /// Factory whose identities this scheduler hands out.
    pub const fn factory(&self) -> &ProcessFactory {
        &self.factory
    }

    /// CPU-bound process from this scheduler's factory (not enqueued).
    pub fn new_cpu_process(&self, name: &str, task: &str, intensity: Option<i64>) -> Process {
        self.factory.new_cpu_process(name, task, intensity)
    }

    /// I/O-bound process from this scheduler's factory (not enqueued).
    pub fn new_io_process(&self, name: &str, device: &str, operations: Option<i64>) -> Process {
        self.factory.new_io_process(name, device, operations)
    }

    /// Daemon process from this scheduler's factory (not enqueued).
    pub fn new_daemon_process(&self, name: &str, service: &str, cycles: Option<i64>) -> Process {
        self.factory.new_daemon_process(name, service, cycles)
    }

    /// Handle used to interrupt the process currently executing.
    ///
    /// A request pending when [`Scheduler::run_all`] starts is discarded. A
    /// request that lands between two processes interrupts the later one
    /// before its first step.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Daemon cycle range in effect.
    pub const fn jitter(&self) -> JitterRange {
        self.jitter
    }

    /// Append a process. Returns `false`, leaving the queue untouched, when
    /// `process` is `None`.
    pub fn enqueue(&mut self, process: Option<Process>) -> bool {
        let Some(process) = process else {
            warn!("rejected enqueue of absent process");
            return false;
        };
        debug!(pid = %process.id(), kind = %process.kind(), "process enqueued");
        self.queue.push(process);
        true
    }

    /// Copy of the queue in execution order.
    pub fn list_snapshot(&self) -> Vec<Process> {
        self.queue.clone()
    }

    /// Execute every queued process once, in order.
    ///
    /// Returns `None` without touching the run counter when the queue is
    /// empty. Otherwise the counter goes up by one before the first process
    /// starts. An interrupted process does not stop the pass. Cancellation
    /// requested before the call is discarded.
    pub fn run_all(&mut self) -> Option<RunSummary> {
        if self.queue.is_empty() {
            debug!("run requested on empty queue");
            return None;
        }

        self.run_count += 1;
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        if self.cancel.take() {
            debug!(%run_id, "discarded cancellation requested before the pass");
        }
        info!(
            %run_id,
            run = self.run_count,
            processes = self.queue.len(),
            "starting pass"
        );

        let mut ctx = ExecutionContext::new(
            run_id,
            self.delay.as_ref(),
            &self.cancel,
            &mut self.rng,
            self.jitter,
        );
        if let Some(audit) = self.audit.as_deref_mut() {
            ctx = ctx.with_audit(audit);
        }
        let reports: Vec<ExecutionReport> =
            self.queue.iter().map(|process| process.execute(&mut ctx)).collect();

        let summary = RunSummary {
            run_id,
            run_number: self.run_count,
            reports,
            wall_time: started.elapsed(),
        };
        info!(
            %run_id,
            run = summary.run_number,
            interrupted = summary.interrupted_count(),
            elapsed_ms = summary.wall_time.as_millis(),
            "pass finished"
        );
        Some(summary)
    }

    /// Sum of estimated durations of queued processes (saturating).
    pub fn total_estimated_duration(&self) -> u64 {
        self.queue
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.estimated_duration()))
    }

    /// Floor of the mean estimated duration, or 0 when the queue is empty.
    pub fn average_estimated_duration(&self) -> u64 {
        if self.queue.is_empty() {
            return 0;
        }
        let total: u128 = self
            .queue
            .iter()
            .map(|p| u128::from(p.estimated_duration()))
            .sum();
        let average = total / self.queue.len() as u128;
        u64::try_from(average).unwrap_or(u64::MAX)
    }

    /// Number of queued processes.
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Completed passes since creation or the last clear.
    pub const fn run_count(&self) -> u64 {
        self.run_count
    }

    /// Snapshot of queue and run statistics.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            queued: self.queue.len(),
            runs: self.run_count,
            average_estimated_duration: self.average_estimated_duration(),
            total_estimated_duration: self.total_estimated_duration(),
        }
    }

    /// Empty the queue and reset the run counter. Identities are not recycled.
    pub fn clear(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        self.run_count = 0;
        info!(dropped, "queue cleared");
    }

    /// Shutdown hook; equivalent to [`Scheduler::clear`].
    pub fn finalize(&mut self) {
        info!("finalizing scheduler");
        self.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Scheduler {
    fn eq(&self, other: &Self) -> bool {
        self.run_count == other.run_count && self.queue == other.queue
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scheduler{{processes={}, runs={}}}",
            self.queue.len(),
            self.run_count
        )
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("queue", &self.queue)
            .field("run_count", &self.run_count)
            .field("jitter", &self.jitter)
            .field("audit", &self.audit.is_some())
            .finish_non_exhaustive()
    }
}
