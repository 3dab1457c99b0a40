#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use wakametrics_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
security:
  expose_metric: true # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert!(!cfg.security.expose_metrics);
    assert_eq!(cfg.metrics.prefix, "wakatime");
    assert_eq!(cfg.server.listen, "0.0.0.0:3000");
    assert_eq!(cfg.backend.active_days, 7);
    assert!(cfg.metrics.worker_count() >= 1);
}

#[test]
fn explicit_workers_override_cpu_default() {
    let cfg = config::load_from_str("version: 1\nmetrics:\n  workers: 3\n").unwrap();
    assert_eq!(cfg.metrics.worker_count(), 3);
}

#[test]
fn rejects_bad_values() {
    let cases = [
        ("version: 2\n", "UNSUPPORTED_VERSION"),
        ("version: 1\nmetrics:\n  prefix: \"9lives\"\n", "BAD_REQUEST"),
        ("version: 1\nmetrics:\n  prefix: \"\"\n", "BAD_REQUEST"),
        ("version: 1\nmetrics:\n  workers: 5000\n", "BAD_REQUEST"),
        ("version: 1\nbackend:\n  active_days: 0\n", "BAD_REQUEST"),
        ("version: 1\nserver:\n  listen: \"nowhere\"\n", "BAD_REQUEST"),
    ];
    for (yaml, code) in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(err.code().as_str(), code, "{yaml}");
    }
}
