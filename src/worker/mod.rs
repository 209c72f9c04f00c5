/*!
 * Background Worker
 * Bounded-queue consumer with start/stop lifecycle
 */

mod config;
mod task;

pub use config::{WorkerConfig, DEFAULT_QUEUE_CAPACITY};
pub use task::Worker;
