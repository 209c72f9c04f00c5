/*!
 * Reference Counter with Zero-Crossing Callback
 */

use parking_lot::Mutex;
use std::fmt;
use std::process::abort;
use std::sync::atomic::{fence, AtomicI32, Ordering};
use tracing::error;

/// Going above this many references aborts the process
const MAX_REF_COUNT: i32 = i32::MAX / 2;

type ReleaseCallback = Box<dyn FnOnce() + Send + 'static>;

/// Atomic reference count that runs a callback exactly once when the last
/// reference is released
///
/// Starts at 1. The decrement and the "was this the last reference?" check are
/// one compare-and-swap, so under concurrent [`release`](Self::release) calls
/// exactly one caller observes the 1 → 0 transition and runs the callback.
///
/// # Panics
///
/// Releasing more times than acquired is a programming error. The count
/// saturates at zero (never goes negative) and `release` panics.
///
/// # Example
///
/// ```
/// use atomic_toolkit::RefCounter;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// let freed = Arc::new(AtomicBool::new(false));
/// let flag = freed.clone();
/// let refs = RefCounter::new(move || flag.store(true, Ordering::SeqCst));
///
/// refs.acquire();
/// assert!(!refs.release());
/// assert!(refs.release());
/// assert!(freed.load(Ordering::SeqCst));
/// ```
pub struct RefCounter {
    refs: AtomicI32,
    on_zero: Mutex<Option<ReleaseCallback>>,
}

impl RefCounter {
    /// Create a counter at 1 that runs `on_zero` when it reaches 0
    pub fn new<F>(on_zero: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            refs: AtomicI32::new(1),
            on_zero: Mutex::new(Some(Box::new(on_zero))),
        }
    }

    /// Create a counter at 1 with no release callback
    pub fn without_callback() -> Self {
        Self {
            refs: AtomicI32::new(1),
            on_zero: Mutex::new(None),
        }
    }

    /// Add a reference and return the new count
    ///
    /// Acquiring after the count reached zero resurrects the counter but never
    /// re-arms the callback. Use [`try_acquire`](Self::try_acquire) to refuse that.
    #[inline]
    pub fn acquire(&self) -> i32 {
        let prev = self.refs.fetch_add(1, Ordering::Relaxed);
        if prev > MAX_REF_COUNT {
            abort();
        }
        prev + 1
    }

    /// Add a reference unless the count already reached zero
    pub fn try_acquire(&self) -> bool {
        let mut current = self.refs.load(Ordering::Relaxed);
        loop {
            if current <= 0 {
                return false;
            }
            if current > MAX_REF_COUNT {
                abort();
            }
            match self.refs.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Drop a reference
    ///
    /// Returns `true` for the one call that released the last reference (and
    /// ran the callback, if any).
    pub fn release(&self) -> bool {
        let previous = self
            .refs
            .fetch_update(Ordering::Release, Ordering::Relaxed, |count| {
                (count > 0).then(|| count - 1)
            });

        match previous {
            Ok(1) => {
                // Pairs with the Release decrements of every other holder
                fence(Ordering::Acquire);
                // Released before the call so the callback may inspect this counter
                let callback = self.on_zero.lock().take();
                if let Some(callback) = callback {
                    callback();
                }
                true
            }
            Ok(_) => false,
            Err(count) => {
                error!(count, "RefCounter released more times than acquired");
                panic!("RefCounter released more times than acquired (count = {count})");
            }
        }
    }

    /// Current reference count
    #[inline]
    pub fn count(&self) -> i32 {
        self.refs.load(Ordering::Acquire)
    }
}

impl fmt::Debug for RefCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefCounter")
            .field("refs", &self.count())
            .field("armed", &self.on_zero.lock().is_some())
            .finish()
    }
}
