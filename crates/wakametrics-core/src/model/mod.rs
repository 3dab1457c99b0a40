//! Metric model (values, labels, per-request collections).
//!
//! A `MetricSet` is built fresh for every scrape, filled by the collector and
//! its workers, then frozen into `SortedMetrics` once all producers have
//! finished. Only `SortedMetrics` can be rendered, so nothing is ever emitted
//! from a half-built or unsorted set.

pub mod metric;
pub mod set;

pub use metric::{saturating_i64, Label, Metric, MetricKind};
pub use set::{MetricSet, SortedMetrics};
