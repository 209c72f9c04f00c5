/*!
 * Sharded Counter
 * Reduces contention by spreading increments across cache-line-aligned shards
 */

use std::sync::atomic::{AtomicI64, Ordering};

/// One counter slot on its own cache line
#[repr(C, align(64))]
#[derive(Debug, Default)]
struct Shard {
    value: AtomicI64,
}

/// Counter partitioned across shards
///
/// # Performance
///
/// - **Writes**: one uncontended `fetch_add` when callers pick distinct hints
/// - **Reads**: sums every shard, O(shards)
/// - **Best for**: hot counters bumped by many threads, read occasionally
///
/// [`total`](Self::total) sums independent loads, so a concurrent writer may be
/// reflected in one shard but not yet in another.
#[derive(Debug)]
pub struct ShardedCounter {
    shards: Box<[Shard]>,
    shard_mask: usize,
}

impl ShardedCounter {
    /// Create with `shard_count` shards
    ///
    /// `shard_count` must be a power of 2
    pub fn new(shard_count: usize) -> Self {
        assert!(
            shard_count > 0 && shard_count.is_power_of_two(),
            "Shard count must be a power of 2"
        );

        Self {
            shards: (0..shard_count).map(|_| Shard::default()).collect(),
            shard_mask: shard_count - 1,
        }
    }

    /// Add `delta` to the shard selected by `shard_hint` (e.g. a thread index)
    #[inline(always)]
    pub fn add(&self, shard_hint: usize, delta: i64) {
        self.shards[shard_hint & self.shard_mask]
            .value
            .fetch_add(delta, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn increment(&self, shard_hint: usize) {
        self.add(shard_hint, 1);
    }

    /// Sum of all shards
    pub fn total(&self) -> i64 {
        self.shards
            .iter()
            .map(|shard| shard.value.load(Ordering::Acquire))
            .fold(0i64, i64::wrapping_add)
    }

    /// Zero every shard independently
    pub fn reset(&self) {
        for shard in self.shards.iter() {
            shard.value.store(0, Ordering::Release);
        }
    }

    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

impl Default for ShardedCounter {
    fn default() -> Self {
        Self::new(16)
    }
}
