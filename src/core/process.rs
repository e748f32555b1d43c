//! Simulated process variants.
//!
//! The set of process kinds is closed: a [`Process`] carries one
//! [`Workload`] (CPU-bound, I/O-bound or daemon) that decides how many timed
//! steps it runs, how long each step waits, and what its planning estimate is.
//!
//! Inputs are never rejected. Blank names and labels fall back to
//! placeholders, and numeric parameters are clamped into range both at
//! construction and on every setter.

use std::fmt;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::audit::{AuditAction, AuditEvent, AuditSink};
use crate::core::delay::{CancellationToken, Delay, WaitOutcome};
use crate::core::identity::ProcessId;

/// Name given to processes created or renamed with a blank name.
pub const PLACEHOLDER_NAME: &str = "unnamed";
/// Task label used when a CPU process is given a blank one.
pub const DEFAULT_TASK: &str = "generic task";
/// Device label used when an I/O process is given a blank one.
pub const DEFAULT_DEVICE: &str = "generic device";
/// Service label used when a daemon is given a blank one.
pub const DEFAULT_SERVICE: &str = "generic service";

/// Lowest CPU intensity.
pub const MIN_INTENSITY: u32 = 1;
/// Highest CPU intensity.
pub const MAX_INTENSITY: u32 = 5;
/// Intensity used when none is given.
pub const DEFAULT_INTENSITY: u32 = 3;
/// Operation count used when none is given.
pub const DEFAULT_OPERATIONS: u32 = 2;
/// Cycle count used when none is given.
pub const DEFAULT_CYCLES: u32 = 3;

/// Fixed part of a CPU step, in units.
pub const CPU_STEP_BASE_UNITS: u64 = 200;
/// Per-intensity part of a CPU step, in units.
pub const CPU_STEP_UNITS_PER_INTENSITY: u64 = 50;
/// Blocking wait of one I/O operation, in units.
pub const IO_WAIT_UNITS: u64 = 400;
/// Planning figure for one daemon cycle (150 base + 50 average jitter).
pub const DAEMON_CYCLE_ESTIMATE_UNITS: u64 = 200;

/// Inclusive range a daemon cycle's randomized wait is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterRange {
    /// Shortest cycle, in units.
    pub min: u64,
    /// Longest cycle, in units.
    pub max: u64,
}

impl JitterRange {
    /// Range used unless configured otherwise.
    pub const DEFAULT: Self = Self { min: 150, max: 250 };

    /// Build a range; the bounds are swapped if given in reverse.
    pub const fn new(a: u64, b: u64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Draw one cycle length.
    pub fn sample(&self, rng: &mut StdRng) -> u64 {
        if self.min >= self.max {
            self.min
        } else {
            rng.random_range(self.as_range())
        }
    }

    fn as_range(&self) -> RangeInclusive<u64> {
        self.min..=self.max
    }
}

impl Default for JitterRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Process kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessKind {
    /// Computation-heavy work.
    #[serde(rename = "CPU")]
    Cpu,
    /// Device-bound work that blocks on I/O.
    #[serde(rename = "I/O")]
    Io,
    /// Background service.
    #[serde(rename = "Daemon")]
    Daemon,
}

/// Static description of a process kind, for informational screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    /// One-line summary.
    pub summary: &'static str,
    /// Typical real-world examples.
    pub examples: &'static str,
    /// Behavioural characteristics.
    pub characteristics: &'static str,
}

impl ProcessKind {
    /// Every kind, in menu order.
    pub const ALL: [Self; 3] = [Self::Cpu, Self::Io, Self::Daemon];

    /// Display tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Io => "I/O",
            Self::Daemon => "Daemon",
        }
    }

    /// Human-readable description of the kind.
    pub const fn info(self) -> KindInfo {
        match self {
            Self::Cpu => KindInfo {
                summary: "computationally intensive tasks",
                examples: "video encoding, calculations, rendering",
                characteristics: "high CPU usage, little I/O",
            },
            Self::Io => KindInfo {
                summary: "input/output operations against devices",
                examples: "file reads, database queries, network requests",
                characteristics: "frequent blocking while waiting on devices",
            },
            Self::Daemon => KindInfo {
                summary: "background system services",
                examples: "monitoring, logging, antivirus scanning",
                characteristics: "continuous execution, low priority",
            },
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn label_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn clamp_intensity(value: i64) -> u32 {
    let clamped = value.clamp(i64::from(MIN_INTENSITY), i64::from(MAX_INTENSITY));
    u32::try_from(clamped).unwrap_or(DEFAULT_INTENSITY)
}

fn at_least_one(value: i64) -> u32 {
    u32::try_from(value.max(1)).unwrap_or(u32::MAX)
}

/// Parameters of a CPU-bound process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuWork {
    task: String,
    intensity: u32,
}

impl CpuWork {
    /// Build with `task` (defaulted if blank) and `intensity` (clamped to 1..=5).
    pub fn new(task: &str, intensity: Option<i64>) -> Self {
        Self {
            task: label_or(task, DEFAULT_TASK),
            intensity: intensity.map_or(DEFAULT_INTENSITY, clamp_intensity),
        }
    }

    /// Task label.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Intensity in 1..=5.
    pub const fn intensity(&self) -> u32 {
        self.intensity
    }

    /// Replace the task label.
    pub fn set_task(&mut self, task: &str) {
        self.task = label_or(task, DEFAULT_TASK);
    }

    /// Replace the intensity, clamping into 1..=5.
    pub fn set_intensity(&mut self, intensity: i64) {
        self.intensity = clamp_intensity(intensity);
    }

    const fn step_units(&self) -> u64 {
        CPU_STEP_BASE_UNITS + CPU_STEP_UNITS_PER_INTENSITY * self.intensity as u64
    }
}

/// Parameters of an I/O-bound process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IoWork {
    device: String,
    operations: u32,
}

impl IoWork {
    /// Build with `device` and `operations` (at least 1, no upper bound).
    ///
    /// `device` is trimmed; a blank label becomes [`DEFAULT_DEVICE`]
    /// (`"generic device"`), like the labels of the other kinds.
    pub fn new(device: &str, operations: Option<i64>) -> Self {
        Self {
            device: label_or(device, DEFAULT_DEVICE),
            operations: operations.map_or(DEFAULT_OPERATIONS, at_least_one),
        }
    }

    /// Device label.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Number of operations, at least 1. There is no upper bound.
    pub const fn operations(&self) -> u32 {
        self.operations
    }

    /// Replace the device label; blank becomes [`DEFAULT_DEVICE`].
    pub fn set_device(&mut self, device: &str) {
        self.device = label_or(device, DEFAULT_DEVICE);
    }

    /// Replace the operation count, raising it to at least 1.
    pub fn set_operations(&mut self, operations: i64) {
        self.operations = at_least_one(operations);
    }
}

/// Parameters of a daemon process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonWork {
    service: String,
    cycles: u32,
}

impl DaemonWork {
    /// Build with `service` (defaulted if blank) and `cycles` (at least 1).
    pub fn new(service: &str, cycles: Option<i64>) -> Self {
        Self {
            service: label_or(service, DEFAULT_SERVICE),
            cycles: cycles.map_or(DEFAULT_CYCLES, at_least_one),
        }
    }

    /// Service label.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Number of monitoring cycles, at least 1.
    pub const fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Replace the service label.
    pub fn set_service(&mut self, service: &str) {
        self.service = label_or(service, DEFAULT_SERVICE);
    }

    /// Replace the cycle count, raising it to at least 1.
    pub fn set_cycles(&mut self, cycles: i64) {
        self.cycles = at_least_one(cycles);
    }
}

/// Variant-specific behaviour of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Workload {
    /// CPU-bound work.
    Cpu(CpuWork),
    /// I/O-bound work.
    Io(IoWork),
    /// Background service.
    Daemon(DaemonWork),
}

impl Workload {
    /// Kind tag of this workload.
    pub const fn kind(&self) -> ProcessKind {
        match self {
            Self::Cpu(_) => ProcessKind::Cpu,
            Self::Io(_) => ProcessKind::Io,
            Self::Daemon(_) => ProcessKind::Daemon,
        }
    }

    /// Number of timed steps `execute` runs.
    pub const fn steps(&self) -> u32 {
        match self {
            Self::Cpu(cpu) => cpu.intensity,
            Self::Io(io) => io.operations,
            Self::Daemon(daemon) => daemon.cycles,
        }
    }

    /// Planning estimate in units. Pure; never runs the workload.
    pub const fn estimated_duration(&self) -> u64 {
        match self {
            Self::Cpu(cpu) => cpu.step_units() * cpu.intensity as u64,
            Self::Io(io) => IO_WAIT_UNITS * io.operations as u64,
            Self::Daemon(daemon) => DAEMON_CYCLE_ESTIMATE_UNITS * daemon.cycles as u64,
        }
    }

    fn step_units(&self, rng: &mut StdRng, jitter: JitterRange) -> u64 {
        match self {
            Self::Cpu(cpu) => cpu.step_units(),
            Self::Io(_) => IO_WAIT_UNITS,
            Self::Daemon(_) => jitter.sample(rng),
        }
    }

    fn opening(&self) -> String {
        match self {
            Self::Cpu(cpu) => format!(
                "executing {} (intensity {}/{MAX_INTENSITY})",
                cpu.task, cpu.intensity
            ),
            Self::Io(io) => format!("starting I/O operations with {}", io.device),
            Self::Daemon(daemon) => format!("starting daemon service {}", daemon.service),
        }
    }

    fn step_detail(&self) -> String {
        match self {
            Self::Cpu(cpu) => format!("processing {}", cpu.task),
            Self::Io(io) => format!("accessing {}", io.device),
            Self::Daemon(daemon) => format!("monitoring {}", daemon.service),
        }
    }

    fn write_suffix(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu(cpu) => write!(f, " - Task: {}, Intensity: {}", cpu.task, cpu.intensity),
            Self::Io(io) => write!(f, " - Device: {}, Operations: {}", io.device, io.operations),
            Self::Daemon(daemon) => {
                write!(f, " - Service: {}, Cycles: {}", daemon.service, daemon.cycles)
            }
        }
    }
}

/// How a single execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Every planned step ran.
    Completed,
    /// Cancellation stopped the process early. Not a failure.
    Interrupted,
}

/// Summary of one `execute` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Executed process.
    pub pid: ProcessId,
    /// Its kind.
    pub kind: ProcessKind,
    /// Steps planned.
    pub planned_steps: u32,
    /// Steps that finished.
    pub completed_steps: u32,
    /// Simulated units actually waited.
    pub waited_units: u64,
    /// How execution ended.
    pub outcome: ExecutionOutcome,
}

impl ExecutionReport {
    /// Whether every planned step ran.
    pub fn is_completed(&self) -> bool {
        self.outcome == ExecutionOutcome::Completed
    }
}

/// Everything a process needs to run its steps.
///
/// Built by the scheduler once per pass and shared by every process in it.
pub struct ExecutionContext<'a> {
    run_id: Uuid,
    delay: &'a dyn Delay,
    cancel: &'a CancellationToken,
    rng: &'a mut StdRng,
    jitter: JitterRange,
    audit: Option<&'a mut dyn AuditSink>,
}

impl<'a> ExecutionContext<'a> {
    /// Assemble a context for the pass `run_id`.
    pub fn new(
        run_id: Uuid,
        delay: &'a dyn Delay,
        cancel: &'a CancellationToken,
        rng: &'a mut StdRng,
        jitter: JitterRange,
    ) -> Self {
        Self {
            run_id,
            delay,
            cancel,
            rng,
            jitter,
            audit: None,
        }
    }

    /// Send step events to `audit`.
    pub fn with_audit(mut self, audit: &'a mut dyn AuditSink) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Pass this context belongs to.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn emit(&mut self, process: &Process, action: AuditAction, detail: Option<String>) {
        if let Some(sink) = self.audit.as_mut() {
            sink.record(AuditEvent::new(
                self.run_id,
                process.id,
                process.kind(),
                action,
                detail,
            ));
        }
    }
}

/// A simulated process.
///
/// Equality compares identity and workload; the display name is not part of it.
#[derive(Debug, Clone, Serialize)]
pub struct Process {
    id: ProcessId,
    name: String,
    workload: Workload,
}

impl Process {
    /// Build a process; normally called through
    /// [`ProcessFactory`](crate::core::factory::ProcessFactory).
    pub fn new(id: ProcessId, name: &str, workload: Workload) -> Self {
        Self {
            id,
            name: label_or(name, PLACEHOLDER_NAME),
            workload,
        }
    }

    /// Identity.
    pub const fn id(&self) -> ProcessId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename; blank names fall back to the placeholder.
    pub fn set_name(&mut self, name: &str) {
        self.name = label_or(name, PLACEHOLDER_NAME);
    }

    /// Kind tag, fixed at construction.
    pub const fn kind(&self) -> ProcessKind {
        self.workload.kind()
    }

    /// Variant parameters.
    pub const fn workload(&self) -> &Workload {
        &self.workload
    }

    /// CPU parameters, if this is a CPU process.
    pub fn as_cpu_mut(&mut self) -> Option<&mut CpuWork> {
        match &mut self.workload {
            Workload::Cpu(cpu) => Some(cpu),
            _ => None,
        }
    }

    /// I/O parameters, if this is an I/O process.
    pub fn as_io_mut(&mut self) -> Option<&mut IoWork> {
        match &mut self.workload {
            Workload::Io(io) => Some(io),
            _ => None,
        }
    }

    /// Daemon parameters, if this is a daemon.
    pub fn as_daemon_mut(&mut self) -> Option<&mut DaemonWork> {
        match &mut self.workload {
            Workload::Daemon(daemon) => Some(daemon),
            _ => None,
        }
    }

    /// Planning estimate in units; see [`Workload::estimated_duration`].
    pub const fn estimated_duration(&self) -> u64 {
        self.workload.estimated_duration()
    }

    /// Run the simulated work.
    ///
    /// Cancellation is checked before each step and observed during each wait.
    /// When seen, the process stops at once and reports
    /// [`ExecutionOutcome::Interrupted`].
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecutionReport {
        let planned = self.workload.steps();
        let detail = self.workload.step_detail();
        info!(pid = %self.id, kind = %self.kind(), "{}", self.workload.opening());
        ctx.emit(
            self,
            AuditAction::Started {
                planned_steps: planned,
            },
            Some(self.workload.opening()),
        );

        let mut waited_units = 0u64;
        for index in 1..=planned {
            if ctx.cancel.take() {
                return self.interrupted(ctx, index - 1, waited_units);
            }

            let units = self.workload.step_units(&mut *ctx.rng, ctx.jitter);
            debug!(pid = %self.id, step = index, total = planned, units, "{detail}");
            if ctx.delay.wait(units, ctx.cancel) == WaitOutcome::Cancelled {
                return self.interrupted(ctx, index - 1, waited_units);
            }
            waited_units = waited_units.saturating_add(units);
            ctx.emit(
                self,
                AuditAction::Step {
                    index,
                    total: planned,
                    units,
                },
                Some(detail.clone()),
            );
        }

        debug!(pid = %self.id, waited_units, "process completed");
        ctx.emit(self, AuditAction::Completed { steps: planned }, None);
        ExecutionReport {
            pid: self.id,
            kind: self.kind(),
            planned_steps: planned,
            completed_steps: planned,
            waited_units,
            outcome: ExecutionOutcome::Completed,
        }
    }

    fn interrupted(
        &self,
        ctx: &mut ExecutionContext<'_>,
        completed_steps: u32,
        waited_units: u64,
    ) -> ExecutionReport {
        let planned = self.workload.steps();
        warn!(
            pid = %self.id,
            completed_steps,
            planned_steps = planned,
            "process interrupted"
        );
        ctx.emit(
            self,
            AuditAction::Interrupted {
                completed_steps,
                planned_steps: planned,
            },
            None,
        );
        ExecutionReport {
            pid: self.id,
            kind: self.kind(),
            planned_steps: planned,
            completed_steps,
            waited_units,
            outcome: ExecutionOutcome::Interrupted,
        }
    }
}

impl PartialEq for Process {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.workload == other.workload
    }
}

impl Eq for Process {}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[PID: {}] {} ({})", self.id, self.name, self.kind())?;
        self.workload.write_suffix(f)
    }
}
