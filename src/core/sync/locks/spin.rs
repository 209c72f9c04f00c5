/*!
 * Spin Lock
 * Busy-wait mutual exclusion without blocking syscalls
 */

use crate::core::sync::config::{Backoff, SpinConfig};
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

/// Busy-wait lock
///
/// `lock` retries a compare-and-swap from free to held until it succeeds;
/// `unlock` is a single release store. There is no fairness: acquisition order
/// among contending threads is arbitrary.
///
/// # Performance
///
/// - Uncontended acquire/release: one CAS plus one store
/// - Contended: burns CPU while waiting, then backs off per [`SpinConfig`]
/// - Only for critical sections of a few instructions
#[derive(Debug)]
pub struct SpinLock {
    locked: AtomicBool,
    config: SpinConfig,
}

impl SpinLock {
    /// Create an unlocked spin lock with the default backoff
    pub const fn new() -> Self {
        Self::with_config(SpinConfig::cooperative())
    }

    pub const fn with_config(config: SpinConfig) -> Self {
        Self {
            locked: AtomicBool::new(false),
            config,
        }
    }

    /// Spin until the lock is acquired
    #[inline]
    pub fn lock(&self) {
        let mut backoff = Backoff::new(self.config);
        // Acquire on success pairs with the Release store in `unlock`
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // Wait on a plain load so contenders don't bounce the cache line with writes
            while self.locked.load(Ordering::Relaxed) {
                backoff.snooze();
            }
        }
    }

    /// Single acquisition attempt
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Release the lock
    ///
    /// Must only be called by the current holder.
    #[inline]
    pub fn unlock(&self) {
        debug_assert!(
            self.locked.load(Ordering::Relaxed),
            "unlock called on a SpinLock that was not held"
        );
        self.locked.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Acquire and return a guard that unlocks on drop
    #[inline]
    pub fn guard(&self) -> SpinGuard<'_> {
        self.lock();
        SpinGuard { lock: self }
    }

    /// Try once; on success return a guard that unlocks on drop
    #[inline]
    pub fn try_guard(&self) -> Option<SpinGuard<'_>> {
        self.try_lock().then(|| SpinGuard { lock: self })
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for [`SpinLock`]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

/// Value protected by a [`SpinLock`]
///
/// # Example
///
/// ```
/// use atomic_toolkit::SpinMutex;
/// use std::thread;
///
/// let total = SpinMutex::new(0u64);
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| *total.lock() += 1);
///     }
/// });
/// assert_eq!(total.into_inner(), 4);
/// ```
pub struct SpinMutex<T> {
    lock: SpinLock,
    value: UnsafeCell<T>,
}

// Safety: access to `value` is serialized by `lock` (Acquire/Release orderings)
unsafe impl<T: Send> Sync for SpinMutex<T> {}

impl<T> SpinMutex<T> {
    pub const fn new(value: T) -> Self {
        Self::with_config(value, SpinConfig::cooperative())
    }

    pub const fn with_config(value: T, config: SpinConfig) -> Self {
        Self {
            lock: SpinLock::with_config(config),
            value: UnsafeCell::new(value),
        }
    }

    #[inline]
    pub fn lock(&self) -> SpinMutexGuard<'_, T> {
        self.lock.lock();
        SpinMutexGuard { mutex: self }
    }

    #[inline]
    pub fn try_lock(&self) -> Option<SpinMutexGuard<'_, T>> {
        self.lock
            .try_lock()
            .then(|| SpinMutexGuard { mutex: self })
    }

    /// Exclusive access without locking; the borrow checker proves no guard exists
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for SpinMutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for SpinMutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_lock() {
            Some(guard) => f.debug_struct("SpinMutex").field("value", &*guard).finish(),
            None => f.debug_struct("SpinMutex").field("value", &"<locked>").finish(),
        }
    }
}

/// RAII guard for [`SpinMutex`]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SpinMutexGuard<'a, T> {
    mutex: &'a SpinMutex<T>,
}

impl<T> Deref for SpinMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: the guard's existence means we hold the lock exclusively
        unsafe { &*self.mutex.value.get() }
    }
}

impl<T> DerefMut for SpinMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: the guard's existence means we hold the lock exclusively
        unsafe { &mut *self.mutex.value.get() }
    }
}

impl<T> Drop for SpinMutexGuard<'_, T> {
    fn drop(&mut self) {
        self.mutex.lock.unlock();
    }
}
