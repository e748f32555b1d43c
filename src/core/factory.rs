//! Process construction entry points.

use std::sync::Arc;

use crate::core::identity::{IdGenerator, ProcessId};
use crate::core::process::{CpuWork, DaemonWork, IoWork, Process, Workload};

/// Creates processes with identities drawn from one shared [`IdGenerator`].
///
/// Clones share the generator, so processes built through any clone never
/// collide.
#[derive(Debug, Clone, Default)]
pub struct ProcessFactory {
    ids: Arc<IdGenerator>,
}

impl ProcessFactory {
    /// Factory whose first process gets `first_pid`.
    pub fn starting_at(first_pid: u64) -> Self {
        Self::with_generator(Arc::new(IdGenerator::starting_at(first_pid)))
    }

    /// Factory backed by an existing generator.
    pub const fn with_generator(ids: Arc<IdGenerator>) -> Self {
        Self { ids }
    }

    /// Identity the next process will receive.
    pub fn next_pid(&self) -> ProcessId {
        self.ids.peek()
    }

    /// CPU-bound process. `intensity` is clamped to 1..=5 and defaults to 3.
    pub fn new_cpu_process(&self, name: &str, task: &str, intensity: Option<i64>) -> Process {
        self.build(name, Workload::Cpu(CpuWork::new(task, intensity)))
    }

    /// I/O-bound process. `operations` is at least 1 and defaults to 2.
    pub fn new_io_process(&self, name: &str, device: &str, operations: Option<i64>) -> Process {
        self.build(name, Workload::Io(IoWork::new(device, operations)))
    }

    /// Daemon process. `cycles` is at least 1 and defaults to 3.
    pub fn new_daemon_process(&self, name: &str, service: &str, cycles: Option<i64>) -> Process {
        self.build(name, Workload::Daemon(DaemonWork::new(service, cycles)))
    }

    fn build(&self, name: &str, workload: Workload) -> Process {
        Process::new(self.ids.next_id(), name, workload)
    }
}
