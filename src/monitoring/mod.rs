/*!
 * Monitoring
 * Lock-free metrics aggregation and tracing setup
 */

mod metrics;
mod tracer;

pub use metrics::{MetricsAggregator, MetricsSnapshot};
pub use tracer::{init_tracing, TRACE_JSON_ENV};
