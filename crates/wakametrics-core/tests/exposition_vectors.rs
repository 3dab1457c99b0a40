//! Golden exposition vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use wakametrics_core::{Metric, MetricSet};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn grouped_declarations() {
    let mut set = MetricSet::new();
    set.push(
        Metric::gauge("wakapi_language_seconds_total", "Total seconds for each language.", 7200)
            .with_label("name", "rust"),
    );
    set.push(Metric::counter("wakapi_num_gc_total", "Total number of GC cycles", 0));
    set.push(
        Metric::gauge("wakapi_language_seconds_total", "Total seconds for each language.", 3600)
            .with_label("name", "go"),
    );
    set.push(Metric::gauge("wakapi_heartbeats_total", "Total number of tracked heartbeats.", 42));

    let body = set.into_sorted().render();
    assert_eq!(body, load("grouped.prom"));
    assert_eq!(body.matches("# HELP wakapi_language_seconds_total").count(), 1);
    assert_eq!(body.matches("# TYPE wakapi_language_seconds_total").count(), 1);
}

#[test]
fn label_values_are_escaped() {
    let desc = "Total seconds for each project.";
    let set: MetricSet = vec![
        Metric::gauge("wakapi_project_seconds_total", desc, 30).with_label("name", "two\nlines"),
        Metric::gauge("wakapi_project_seconds_total", desc, 10).with_label("name", "C:\\work"),
        Metric::gauge("wakapi_project_seconds_total", desc, 20).with_label("name", "say \"hi\""),
    ]
    .into_iter()
    .collect();

    assert_eq!(set.into_sorted().render(), load("escaped.prom"));
}

#[test]
fn empty_set_renders_nothing() {
    assert_eq!(MetricSet::new().into_sorted().render(), "");
}
