//! # auth
//!
//! Optional shared-secret check for the journal API (`/api/ping`,
//! `/api/analytics`, `/api/import`, `/api/trades`).
//!
//! The key comes from [`Config::api_key`](crate::config::Config), loaded
//! once at startup, not from the environment per request. With no key
//! configured the desktop shell talks to a loopback server and every
//! request passes. With a key, requests must carry it in [`API_KEY_HEADER`]
//! or get a 401 `{ok:false,error}` body.
//!
//! `/health` stays open so a supervisor can probe liveness without the key.

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::state::SharedState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Rejects requests whose `X-API-Key` does not match the configured key.
pub async fn require_api_key(
    State(state): State<SharedState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_key.as_deref() else {
        return next.run(request).await;
    };

    let path = request.uri().path();
    if path == "/health" {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided == expected {
        next.run(request).await
    } else {
        warn!(path, "❌ Unauthorized request — invalid or missing X-API-Key");
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "ok":    false,
                "error": "Unauthorized: invalid or missing X-API-Key header",
            })),
        )
            .into_response()
    }
}
