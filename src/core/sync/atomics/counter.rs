/*!
 * Atomic Counter
 * Signed 64-bit tally mutated only through single atomic instructions
 */

use std::sync::atomic::{AtomicI64, Ordering};

/// Signed 64-bit atomic counter
///
/// Every operation is one atomic instruction with `SeqCst` ordering, so the
/// visible value always equals the net sum of all completed adds no matter how
/// callers interleave. Overflow wraps.
///
/// # Example
///
/// ```
/// use atomic_toolkit::Counter;
///
/// let counter = Counter::new(0);
/// assert_eq!(counter.add(5), 5);
/// assert!(counter.compare_and_set(5, 10));
/// assert!(!counter.compare_and_set(5, 20));
/// assert_eq!(counter.get(), 10);
/// ```
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    /// Create a counter holding `initial`
    #[inline]
    pub const fn new(initial: i64) -> Self {
        Self {
            value: AtomicI64::new(initial),
        }
    }

    /// Add `delta` and return the new value
    #[inline(always)]
    pub fn add(&self, delta: i64) -> i64 {
        self.value
            .fetch_add(delta, Ordering::SeqCst)
            .wrapping_add(delta)
    }

    #[inline(always)]
    pub fn increment(&self) -> i64 {
        self.add(1)
    }

    #[inline(always)]
    pub fn decrement(&self) -> i64 {
        self.add(-1)
    }

    /// Current value
    #[inline(always)]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Overwrite the value
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::SeqCst);
    }

    /// Overwrite the value and return the previous one
    #[inline]
    pub fn swap(&self, value: i64) -> i64 {
        self.value.swap(value, Ordering::SeqCst)
    }

    /// Replace the value with `new` iff it currently equals `expected`
    ///
    /// A `false` return leaves the counter untouched. Retrying is up to the caller.
    #[inline]
    pub fn compare_and_set(&self, expected: i64, new: i64) -> bool {
        self.value
            .compare_exchange(expected, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
