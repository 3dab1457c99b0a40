//! Metrics collection pipeline.
//!
//! - `collector`: sequential user/admin phases against the collaborators.
//! - `aggregator`: bounded per-active-user fan-out for the admin segment.
//! - `names`: metric names and descriptions.
//! - `interval`: "today" / all-time interval resolution and duration parsing.

pub mod aggregator;
pub mod collector;
pub mod interval;
pub mod names;

pub use aggregator::PerUserAggregator;
pub use collector::{MetricsCollector, Principal};
pub use names::MetricNames;
