//! Metric publishing port.
//!
//! Implementation: `who-web` crate (prometheus registry).

use crate::models::session::AggregationResult;

/// Sink for the result of each completed cycle
pub trait MetricsPublisher: Send + Sync {
    /// Replace the published snapshot with `result`.
    ///
    /// Labeled samples absent from `result` must disappear.
    fn publish(&self, result: &AggregationResult);
}
