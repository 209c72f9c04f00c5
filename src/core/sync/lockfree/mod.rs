/*!
 * Lock-Free Data Structures
 * Read-copy-update configuration and contention-spreading counters
 */

pub mod sharded;
pub mod versioned;

pub use sharded::ShardedCounter;
pub use versioned::{Snapshot, VersionedConfig};
