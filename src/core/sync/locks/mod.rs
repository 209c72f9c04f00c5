/*!
 * Lock Implementations
 * Busy-wait locks for very short critical sections
 */

pub mod spin;

pub use spin::{SpinGuard, SpinLock, SpinMutex, SpinMutexGuard};
