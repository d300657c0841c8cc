//! # routes::journal
//!
//! The three calls wired to the desktop UI's buttons.
//!
//! | Method | Path             | UI action       |
//! |--------|------------------|-----------------|
//! | GET    | `/api/ping`      | Ping            |
//! | POST   | `/api/analytics` | Apply Filters   |
//! | POST   | `/api/import`    | Import CSV      |
//! | GET    | `/health`        | (liveness)      |

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;

use crate::{
    error::AppError,
    models::Query,
    state::{AppState, SharedState},
};

// ─── GET /api/ping ────────────────────────────────────────────────────────────

pub async fn ping(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok":      true,
        "version": state.journal.ping(),
    }))
}

// ─── POST /api/analytics ──────────────────────────────────────────────────────

/// `seq` is echoed back untouched so the UI can drop a response that arrives
/// after a newer Apply-Filters click.
pub async fn get_analytics(
    State(state): State<SharedState>,
    Json(query): Json<Query>,
) -> Result<impl IntoResponse, AppError> {
    AppState::bump(&state.analytics_count);
    let analytics = state.journal.get_analytics(&query).await?;

    Ok(Json(json!({
        "ok":        true,
        "analytics": analytics,
        "seq":       query.seq,
    })))
}

// ─── POST /api/import ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ImportRequest {
    /// Raw CSV text, header row included.
    pub csv: String,
}

pub async fn import_csv(
    State(state): State<SharedState>,
    Json(req): Json<ImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    AppState::bump(&state.import_count);
    let report = state.journal.import_csv(&req.csv).await?;

    Ok(Json(json!({ "ok": true, "report": report })))
}

// ─── GET /health ──────────────────────────────────────────────────────────────

pub async fn health_check(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    let trades = state.journal.trade_count().await?;

    Ok(Json(json!({
        "ok":              true,
        "version":         state.journal.ping(),
        "store":           state.journal.backend(),
        "trades":          trades,
        "analytics_count": state.analytics_count.load(Ordering::Relaxed),
        "import_count":    state.import_count.load(Ordering::Relaxed),
        "started_at":      state.started_at,
    })))
}
