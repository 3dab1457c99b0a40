use std::borrow::Cow;

/// Metric kind, rendered into the `# TYPE` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Instantaneous value, may rise or fall.
    Gauge,
    /// Cumulative value, expected non-decreasing for the process lifetime.
    Counter,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// One `(key, value)` label pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub key: Cow<'static, str>,
    pub value: String,
}

impl Label {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single sample: name, description, kind, value and ordered labels.
///
/// Label keys are expected to be unique within one metric. All metrics that
/// share a name within one response must agree on `kind` and `desc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
    pub desc: &'static str,
    pub kind: MetricKind,
    pub value: i64,
    pub labels: Vec<Label>,
}

impl Metric {
    pub fn gauge(name: impl Into<String>, desc: &'static str, value: i64) -> Self {
        Self {
            name: name.into(),
            desc,
            kind: MetricKind::Gauge,
            value,
            labels: Vec::new(),
        }
    }

    pub fn counter(name: impl Into<String>, desc: &'static str, value: i64) -> Self {
        Self {
            name: name.into(),
            desc,
            kind: MetricKind::Counter,
            value,
            labels: Vec::new(),
        }
    }

    /// Append a label (builder style).
    pub fn with_label(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        self.labels.push(Label::new(key, value));
        self
    }

    /// Value of the first label, or `""` for unlabeled metrics. Secondary sort key.
    pub fn first_label_value(&self) -> &str {
        self.labels.first().map(|l| l.value.as_str()).unwrap_or("")
    }
}

/// Saturating conversion for unsigned collaborator values (bytes, nanoseconds).
pub fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
