/*!
 * Atomic Toolkit
 * Lock-free, atomic-operation-based concurrency primitives
 *
 * Every primitive is a plain value: construct it, share it (usually behind an
 * `Arc`) and drop it. There are no process-wide registries.
 */

pub mod collections;
pub mod core;
pub mod monitoring;
pub mod worker;

// Re-exports
pub use collections::ConcurrentMap;
pub use crate::core::errors::{ConfigError, ConfigResult, WorkerError, WorkerResult};
pub use crate::core::sync::{
    BackoffStrategy, Counter, Flag, RefCounter, ShardedCounter, Snapshot, SpinConfig, SpinGuard,
    SpinLock, SpinMutex, SpinMutexGuard, VersionedConfig,
};
pub use monitoring::{init_tracing, MetricsAggregator, MetricsSnapshot};
pub use worker::{Worker, WorkerConfig};
