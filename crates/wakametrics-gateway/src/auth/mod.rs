//! Request authentication.
//!
//! The middleware resolves an API key to a user through an `Authenticator`
//! and stores the resulting `Principal` in the request extensions. It never
//! rejects a request itself: handlers decide what a missing principal means.
//!
//! Accepted credentials, first match wins:
//! - `Authorization: Bearer <api key>`
//! - `Authorization: Basic <base64(api key)>`
//! - `?api_key=<api key>`

use async_trait::async_trait;
use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use serde::Deserialize;

use wakametrics_core::error::Result;

use crate::app_state::AppState;
use crate::backend::User;
use crate::collect::Principal;

/// Resolves API keys to users.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, api_key: &str) -> Result<Option<User>>;
}

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Extract the API key from the request, if any.
pub fn extract_api_key(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(key) = value.strip_prefix("Bearer ") {
            let key = key.trim();
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
        if let Some(encoded) = value.strip_prefix("Basic ") {
            if let Some(key) = decode_basic(encoded.trim()) {
                return Some(key);
            }
        }
    }

    Query::<ApiKeyQuery>::try_from_uri(uri)
        .ok()
        .and_then(|q| q.0.api_key)
        .filter(|k| !k.is_empty())
}

fn decode_basic(encoded: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    // `user:key` as sent by HTTP clients; a bare key is accepted as well
    let key = decoded.rsplit_once(':').map(|(_, k)| k).unwrap_or(&decoded);
    (!key.is_empty()).then(|| key.to_string())
}

/// Axum middleware: attach a `Principal` when the request carries a valid key.
pub async fn authenticate(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(key) = extract_api_key(req.headers(), req.uri()) {
        match app.authenticator().authenticate(&key).await {
            Ok(Some(user)) => {
                tracing::trace!(user = %user.id, "request authenticated");
                req.extensions_mut().insert(Principal { user });
            }
            Ok(None) => tracing::debug!("unknown api key"),
            Err(e) => tracing::warn!(error = %e, "authentication backend failed"),
        }
    }
    next.run(req).await
}
