#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use wakametrics_gateway::app_state::AppState;
use wakametrics_gateway::backend::{SummaryKind, User};
use wakametrics_gateway::{config, router};

use common::{samples, state, summary, FakeBackend};

fn fixture() -> FakeBackend {
    let mut fake = FakeBackend::new()
        .with_user(User::admin("root"))
        .with_user(User::new("A"))
        .with_user(User::new("B"));
    fake.active = vec![fake.user("A"), fake.user("B")];
    fake.all_time.insert("A".into(), summary(&[(SummaryKind::Project, "x", 120)]));
    fake.all_time.insert("B".into(), summary(&[(SummaryKind::Project, "y", 240)]));
    fake.failing_summaries.insert("B".into());
    fake.today.insert(
        "A".into(),
        summary(&[(SummaryKind::Language, "rust", 30), (SummaryKind::Language, "go", 10)]),
    );
    fake
}

async fn get(app: Router, uri: &str, key: Option<&str>) -> (StatusCode, Option<String>, String) {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(key) = key {
        req = req.header(header::AUTHORIZATION, format!("Bearer {key}"));
    }
    let resp = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn missing_principal_is_401() {
    let fake = Arc::new(fixture());
    let app = router::build_router(state(&fake));

    let (status, _, body) = get(app.clone(), "/api/metrics", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "401 unauthorized");

    let (status, _, body) = get(app, "/api/metrics", Some("not-a-key")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "401 unauthorized");
}

#[tokio::test]
async fn admin_scrape_survives_per_user_failure() {
    let fake = Arc::new(fixture());
    let app = router::build_router(state(&fake));

    let (status, content_type, body) = get(app, "/api/metrics", Some("key-root")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));

    let lines = samples(&body);
    assert!(lines.contains(&"wakapi_admin_user_time_seconds_total{user=\"A\"} 120"));
    assert!(!body.contains("wakapi_admin_user_time_seconds_total{user=\"B\"}"));
    assert!(lines.contains(&"wakapi_admin_users_active_total 2"));
}

#[tokio::test]
async fn user_scrape_groups_declarations() {
    let fake = Arc::new(fixture());
    let app = router::build_router(state(&fake));

    let (status, _, body) = get(app, "/api/metrics?api_key=key-A", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(concat!(
        "# HELP wakapi_language_seconds_total Total seconds for each language.\n",
        "# TYPE wakapi_language_seconds_total gauge\n",
        "wakapi_language_seconds_total{name=\"go\"} 10\n",
        "wakapi_language_seconds_total{name=\"rust\"} 30\n",
    )));
    assert_eq!(body.matches("# HELP wakapi_language_seconds_total").count(), 1);
    assert!(!body.contains("_admin_"));
}

#[tokio::test]
async fn backend_failure_is_500_with_generic_body() {
    let mut fake = fixture();
    fake.failing_calls.insert("repository.database_size");
    let app = router::build_router(state(&Arc::new(fake)));

    let (status, _, body) = get(app, "/api/metrics", Some("key-A")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "500 internal server error");
}

#[tokio::test]
async fn route_absent_when_not_exposed() {
    let fake = Arc::new(fixture());
    let cfg = config::load_from_str("version: 1\n").unwrap();
    assert!(!cfg.security.expose_metrics);
    let app = router::build_router(AppState::new(cfg, fake.backends(), fake.clone()));

    let (status, _, _) = get(app, "/api/metrics", Some("key-root")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_scrapes_are_identical() {
    let fake = Arc::new(fixture());
    let app = router::build_router(state(&fake));

    let (_, _, first) = get(app.clone(), "/api/metrics", Some("key-root")).await;
    let (_, _, second) = get(app, "/api/metrics", Some("key-root")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn dropped_request_stops_per_user_lookups() {
    let mut fake = fixture();
    fake.hanging_summaries.insert("A".into());
    let fake = Arc::new(fake);
    let app = router::build_router(state(&fake));

    let req = Request::builder()
        .method("GET")
        .uri("/api/metrics")
        .header(header::AUTHORIZATION, "Bearer key-root")
        .body(Body::empty())
        .unwrap();
    let outcome = tokio::time::timeout(Duration::from_millis(200), app.oneshot(req)).await;
    assert!(outcome.is_err(), "scrape must still be waiting on the hung lookup");

    tokio::time::sleep(Duration::from_millis(50)).await;
    let alive = tokio::runtime::Handle::current().metrics().num_alive_tasks();
    assert_eq!(alive, 0, "per-user lookups must not outlive the request");
}
