/*!
 * Atomic Flag
 * Single-bit toggleable state
 */

use std::sync::atomic::{AtomicBool, Ordering};

/// Atomic boolean flag
///
/// Backed by an [`AtomicBool`], so it is only ever observed as exactly set
/// or clear.
#[derive(Debug, Default)]
pub struct Flag {
    state: AtomicBool,
}

impl Flag {
    #[inline]
    pub const fn new(initial: bool) -> Self {
        Self {
            state: AtomicBool::new(initial),
        }
    }

    #[inline]
    pub fn set(&self) {
        self.state.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn clear(&self) {
        self.state.store(false, Ordering::SeqCst);
    }

    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }

    /// Flip the flag and return the state this call produced
    ///
    /// Compare-and-swap retry loop: concurrent toggles are each applied exactly
    /// once, and the return value is never a stale read.
    pub fn toggle(&self) -> bool {
        let mut current = self.state.load(Ordering::SeqCst);
        loop {
            let next = !current;
            match self.state.compare_exchange_weak(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }

    /// Move from `current` to `new` iff the flag currently equals `current`
    #[inline]
    pub fn compare_and_set(&self, current: bool, new: bool) -> bool {
        self.state
            .compare_exchange(current, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
