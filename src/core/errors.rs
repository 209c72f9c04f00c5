/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Versioned configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Configuration has not been stored yet")]
    #[diagnostic(
        code(config::unset),
        help("Construct with VersionedConfig::new(initial) or call store() before load().")
    )]
    Unset,
}

/// Background worker errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum WorkerError {
    #[error("Work queue is full (capacity {0})")]
    #[diagnostic(
        code(worker::queue_full),
        help("The consumer is falling behind. Increase WorkerConfig::capacity or shed load.")
    )]
    QueueFull(usize),

    #[error("Worker is not running")]
    #[diagnostic(
        code(worker::not_running),
        help("Call start() before submitting work.")
    )]
    NotRunning,

    #[error("Failed to spawn worker thread: {0}")]
    #[diagnostic(
        code(worker::spawn_failed),
        help("The OS refused to create a thread. Check process thread limits.")
    )]
    SpawnFailed(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;
