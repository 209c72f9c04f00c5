/*!
 * Atomic Primitives
 * Counter, flag and reference counter built on single atomic words
 */

mod counter;
mod flag;
mod refcount;

pub use counter::Counter;
pub use flag::Flag;
pub use refcount::RefCounter;
