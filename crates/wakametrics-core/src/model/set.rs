use std::cmp::Ordering;

use super::metric::Metric;
use crate::exposition;

/// Ordered, append-only collection of metrics for one request.
///
/// Identical `(name, labels)` pairs are kept as-is; if two producers emit the
/// same series, both are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSet {
    metrics: Vec<Metric>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    /// Move every metric of `other` to the end of this set.
    pub fn merge(&mut self, other: MetricSet) {
        self.metrics.extend(other.metrics);
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    /// Sort by (name, first label value) and freeze the set for rendering.
    ///
    /// The sort is stable, so metrics comparing equal keep insertion order.
    pub fn into_sorted(mut self) -> SortedMetrics {
        self.metrics.sort_by(compare);
        SortedMetrics {
            metrics: self.metrics,
        }
    }
}

impl Extend<Metric> for MetricSet {
    fn extend<I: IntoIterator<Item = Metric>>(&mut self, iter: I) {
        self.metrics.extend(iter);
    }
}

impl FromIterator<Metric> for MetricSet {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        Self {
            metrics: iter.into_iter().collect(),
        }
    }
}

/// Ordering used for the final response: name first, then the first label's value.
pub fn compare(a: &Metric, b: &Metric) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.first_label_value().cmp(b.first_label_value()))
}

/// A finalized, sorted metric set. The only input the renderer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedMetrics {
    metrics: Vec<Metric>,
}

impl SortedMetrics {
    pub fn as_slice(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        exposition::render(&self.metrics)
    }
}
