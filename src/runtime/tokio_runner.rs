//! Tokio adapter that runs passes on the blocking thread pool.

use std::sync::Arc;

use crate::core::{RunSummary, SchedulerError};
use crate::runtime::SharedScheduler;

/// Runs scheduler passes from async code without stalling runtime workers.
#[derive(Clone, Debug)]
pub struct TokioRunner {
    handle: Arc<tokio::runtime::Handle>,
}

impl TokioRunner {
    /// Create a runner from a tokio runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Create a runner on the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    /// Run one pass on the blocking pool and await its summary.
    pub async fn run_all(&self, shared: &SharedScheduler) -> Result<Option<RunSummary>, SchedulerError> {
        let shared = shared.clone();
        self.handle
            .spawn_blocking(move || shared.run_all())
            .await
            .map_err(|e| SchedulerError::Worker(e.to_string()))
    }
}
