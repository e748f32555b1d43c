//! Runtime adapters for running passes off the caller's thread.

pub mod shared;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_runner;

pub use shared::{RunHandle, SharedScheduler};
#[cfg(feature = "tokio-runtime")]
pub use tokio_runner::TokioRunner;
