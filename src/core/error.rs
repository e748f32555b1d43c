//! Error types for scheduler operations.
//!
//! The simulation itself never fails: bad magnitudes are clamped, absent
//! processes are reported through `enqueue` returning `false`, and
//! cancellation is an ordinary outcome. These errors cover the ambient
//! surface around it (configuration and worker threads).

use thiserror::Error;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Configuration JSON could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
    /// An environment variable held a value that could not be parsed.
    #[error("environment variable `{name}` invalid: {reason}")]
    Env {
        /// Variable name.
        name: String,
        /// Parse failure description.
        reason: String,
    },
    /// A background run could not be joined (worker panic or runtime shutdown).
    #[error("worker error: {0}")]
    Worker(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
