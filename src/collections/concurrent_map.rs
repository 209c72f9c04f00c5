/*!
 * Concurrent Map
 * Sharded key/value store with a side-maintained size counter
 */

use crate::core::sync::Counter;
use ahash::RandomState;
use dashmap::DashMap;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

/// Key/value map safe for concurrent use, with an approximate size counter
///
/// Single-key `set`/`get`/`delete` are atomic (DashMap shard locks). The size
/// counter is adjusted in a separate step after the store mutation:
///
/// - `set` checks whether the key exists, inserts, then increments if it was absent
/// - `delete` removes, then decrements if something was removed
///
/// Two threads setting the same absent key can both see it absent and both
/// increment, so [`size`](Self::size) may over-count under concurrent writers to
/// one key. Use [`len`](Self::len) when an exact count is needed.
pub struct ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, V, RandomState>,
    size: Counter,
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
            size: Counter::new(0),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            size: Counter::new(0),
        }
    }

    /// Store `value` under `key`, overwriting any previous value
    pub fn set(&self, key: K, value: V) {
        let existed = self.entries.contains_key(&key);
        self.entries.insert(key, value);
        if !existed {
            self.size.increment();
        }
    }

    /// Clone of the value stored under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Run `f` on the value under `key` without cloning it
    ///
    /// The key's shard stays read-locked while `f` runs.
    pub fn with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.entries.get(key).map(|entry| f(entry.value()))
    }

    /// Remove `key`; returns whether anything was removed
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.size.decrement();
        }
        removed
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Approximate number of distinct keys (see type docs)
    #[inline]
    pub fn size(&self) -> i64 {
        self.size.get()
    }

    /// Exact number of entries, counted shard by shard
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentMap")
            .field("size", &self.size())
            .field("len", &self.len())
            .finish()
    }
}
