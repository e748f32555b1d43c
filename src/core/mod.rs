//! Core simulation abstractions: processes, delays, identity and the scheduler.

pub mod audit;
pub mod delay;
pub mod error;
pub mod factory;
pub mod identity;
pub mod process;
pub mod scheduler;

#[cfg(not(target_arch = "wasm32"))]
pub use audit::ChannelAuditSink;
pub use audit::{AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use delay::{CancellationToken, Delay, InstantDelay, ThreadDelay, VirtualClock, WaitOutcome};
pub use error::{AppResult, SchedulerError};
pub use factory::ProcessFactory;
pub use identity::{IdGenerator, ProcessId, FIRST_PID, MAX_FIRST_PID};
pub use process::{
    CpuWork, DaemonWork, ExecutionContext, ExecutionOutcome, ExecutionReport, IoWork, JitterRange,
    KindInfo, Process, ProcessKind, Workload,
};
pub use scheduler::{RunSummary, Scheduler, SchedulerStats};
