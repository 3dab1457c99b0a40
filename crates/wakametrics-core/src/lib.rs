//! wakametrics core: metric model, exposition renderer, and error types.
//!
//! This crate defines the value types collected on every scrape and the
//! Prometheus-compatible text format they are rendered to. It carries no
//! transport or runtime dependencies so it can be reused outside the gateway.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `MetricsError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod model;

/// Shared result type.
pub use error::{ErrorCode, MetricsError, Result};
pub use model::{Label, Metric, MetricKind, MetricSet, SortedMetrics};
