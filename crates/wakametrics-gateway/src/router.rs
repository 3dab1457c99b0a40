//! Axum router wiring.
//!
//! `/api/metrics` is only registered when `security.expose_metrics` is set;
//! otherwise the router has no routes and every request is a 404.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, auth, ops};

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();

    if state.cfg().security.expose_metrics {
        tracing::info!("exposing prometheus metrics under /api/metrics");
        let api = Router::new()
            .route("/metrics", get(ops::metrics))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::authenticate));
        router = router.nest("/api", api);
    }

    router.with_state(state)
}
