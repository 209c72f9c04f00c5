/*!
 * Worker Configuration
 */

use serde::{Deserialize, Serialize};

/// Default bound of the work queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Background worker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum queued items; submissions beyond it are dropped
    pub capacity: usize,
    /// Name given to the consumer thread
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name: String::from("toolkit-worker"),
        }
    }
}

impl WorkerConfig {
    /// Default configuration with a different queue bound
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn named(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }
}
