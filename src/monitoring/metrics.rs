/*!
 * Metrics Aggregation
 * Lock-free request/error/byte counters
 */

use crate::core::sync::Counter;
use serde::{Deserialize, Serialize};

/// Point-in-time-ish view of a [`MetricsAggregator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests: i64,
    pub errors: i64,
    pub bytes: i64,
}

impl MetricsSnapshot {
    /// Errors per request, 0.0 when no requests were recorded
    pub fn error_rate(&self) -> f64 {
        if self.requests <= 0 {
            return 0.0;
        }
        self.errors as f64 / self.requests as f64
    }
}

impl From<MetricsSnapshot> for (i64, i64, i64) {
    fn from(snapshot: MetricsSnapshot) -> Self {
        (snapshot.requests, snapshot.errors, snapshot.bytes)
    }
}

/// Three independent monotonic counters: requests, errors and bytes
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with neighbouring data
/// - Every record is a single atomic add
///
/// # Consistency
/// Fields are independently, not jointly, consistent. A snapshot taken while
/// writers are active may include a request without its bytes, and a write
/// racing with [`reset`](Self::reset) may be lost or survive. That is accepted
/// imprecision for monitoring.
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    requests: Counter,
    errors: Counter,
    bytes: Counter,
}

impl MetricsAggregator {
    pub const fn new() -> Self {
        Self {
            requests: Counter::new(0),
            errors: Counter::new(0),
            bytes: Counter::new(0),
        }
    }

    /// # Performance
    /// Hot path - called on every request
    #[inline(always)]
    pub fn record_request(&self) {
        self.requests.increment();
    }

    #[inline(always)]
    pub fn record_error(&self) {
        self.errors.increment();
    }

    #[inline(always)]
    pub fn record_bytes(&self, bytes: i64) {
        self.bytes.add(bytes);
    }

    /// Read all three counters (independently, no locks)
    #[inline]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.get(),
            errors: self.errors.get(),
            bytes: self.bytes.get(),
        }
    }

    /// Zero each counter
    pub fn reset(&self) {
        self.requests.set(0);
        self.errors.set(0);
        self.bytes.set(0);
    }
}
