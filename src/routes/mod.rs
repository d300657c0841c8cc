//! HTTP surface of the journal service.

pub mod journal;
pub mod trades;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth::require_api_key, state::SharedState};

/// Builds the full router with middleware attached.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── UI calls ──────────────────────────────────────────────────────────
        .route("/api/ping",       get(journal::ping))
        .route("/api/analytics",  post(journal::get_analytics))
        .route("/api/import",     post(journal::import_csv))
        // ── Trade table ───────────────────────────────────────────────────────
        .route("/api/trades",     get(trades::list_trades).post(trades::upsert_trade))
        .route("/api/trades/:id", delete(trades::delete_trade))
        // ── Liveness ──────────────────────────────────────────────────────────
        .route("/health",         get(journal::health_check))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(DefaultBodyLimit::max(state.config.import_max_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
