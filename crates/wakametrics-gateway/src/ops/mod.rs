//! Operational HTTP endpoints.
//!
//! - `/api/metrics` : Prometheus text format, scoped to the authenticated user

use axum::{
    extract::{Extension, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;

use wakametrics_core::error::{ErrorCode, MetricsError};

use crate::app_state::AppState;
use crate::collect::Principal;

pub const BODY_UNAUTHORIZED: &str = "401 unauthorized";
pub const BODY_INTERNAL_SERVER_ERROR: &str = "500 internal server error";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

pub async fn metrics(
    State(app): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> Response {
    // Cancels in-flight per-user tasks if the client goes away and this future is dropped.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let principal = principal.map(|Extension(p)| p);
    match app.collector().collect(principal.as_ref(), &cancel).await {
        Ok(sorted) => (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_PLAIN)], sorted.render()).into_response(),
        Err(e) => error_response(&e, principal.as_ref()),
    }
}

fn error_response(err: &MetricsError, principal: Option<&Principal>) -> Response {
    let user = principal.map(|p| p.user.id.as_str()).unwrap_or("-");
    let status = status_for(err.code());

    match err.code() {
        ErrorCode::Unauthorized => {}
        ErrorCode::Cancelled => tracing::debug!(user, "metrics request cancelled"),
        code => tracing::error!(user, code = code.as_str(), error = %err, "metrics collection failed"),
    }

    let body = if status == StatusCode::UNAUTHORIZED {
        BODY_UNAUTHORIZED
    } else {
        BODY_INTERNAL_SERVER_ERROR
    };
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

/// HTTP status for an error on this endpoint. Only a missing principal is a
/// client error; every other failure is reported as a server error.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
