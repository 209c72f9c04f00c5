/*!
 * Synchronization Primitives
 *
 * Lock-free building blocks built directly on atomic instructions:
 * - Counter, flag and reference counter (single atomic word each)
 * - Versioned configuration with read-copy-update publication
 * - Spin lock with configurable backoff
 *
 * # Ordering
 *
 * Every operation on a single primitive is atomic and observed in one global
 * order by all threads. Nothing ties two different primitives together: a
 * caller combining several of them gets no cross-primitive transaction.
 */

pub mod atomics;
mod config;
pub mod lockfree;
pub mod locks;

pub use atomics::{Counter, Flag, RefCounter};
pub use config::{BackoffStrategy, SpinConfig};
pub use lockfree::{ShardedCounter, Snapshot, VersionedConfig};
pub use locks::{SpinGuard, SpinLock, SpinMutex, SpinMutexGuard};
