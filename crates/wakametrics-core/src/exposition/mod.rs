//! Prometheus text exposition (version 0.0.4) renderer.
//!
//! Declarations are grouped per metric name: one `# HELP` and one `# TYPE`
//! line, followed by every sample sharing that name. Input must already be
//! sorted (see `MetricSet::into_sorted`); samples of one name are expected to
//! be contiguous.

use std::fmt::Write;

use crate::model::Metric;

/// Escape a label value: backslash, double quote and line feed.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape HELP text: backslash and line feed.
pub fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render a sorted metric slice.
pub(crate) fn render(metrics: &[Metric]) -> String {
    let mut out = String::new();
    let mut current: Option<&Metric> = None;

    for m in metrics {
        match current {
            Some(head) if head.name == m.name => {
                if head.kind != m.kind || head.desc != m.desc {
                    tracing::warn!(
                        name = %m.name,
                        "metric redeclared with a different kind or description; keeping the first"
                    );
                }
            }
            _ => {
                write_declaration(&mut out, m);
                current = Some(m);
            }
        }
        write_sample(&mut out, m);
    }
    out
}

fn write_declaration(out: &mut String, m: &Metric) {
    let _ = writeln!(out, "# HELP {} {}", m.name, escape_help(m.desc));
    let _ = writeln!(out, "# TYPE {} {}", m.name, m.kind.as_str());
}

fn write_sample(out: &mut String, m: &Metric) {
    out.push_str(&m.name);
    if !m.labels.is_empty() {
        let label_str = m
            .labels
            .iter()
            .map(|l| format!("{}=\"{}\"", l.key, escape_label(&l.value)))
            .collect::<Vec<_>>()
            .join(",");
        let _ = write!(out, "{{{}}}", label_str);
    }
    let _ = writeln!(out, " {}", m.value);
}
