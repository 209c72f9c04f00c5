/*!
 * Core Module
 * Fundamental primitives and error handling
 */

pub mod errors;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use sync::*;
