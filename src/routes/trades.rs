//! # routes::trades
//!
//! Trade table endpoints (list / edit / delete).

use axum::{
    extract::{Path, Query as QueryString, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Query, TradeInput},
    state::SharedState,
};

/// GET /api/trades?symbol=..&side=..&startTime=..&endTime=..&limit=..&offset=..
pub async fn list_trades(
    State(state): State<SharedState>,
    QueryString(query): QueryString<Query>,
) -> Result<impl IntoResponse, AppError> {
    let trades = state.journal.list_trades(query).await?;
    Ok(Json(json!({ "ok": true, "count": trades.len(), "trades": trades })))
}

/// POST /api/trades — create, or update when `id` matches an existing trade
pub async fn upsert_trade(
    State(state): State<SharedState>,
    Json(input): Json<TradeInput>,
) -> Result<impl IntoResponse, AppError> {
    let trade = state.journal.upsert_trade(input).await?;
    Ok(Json(json!({ "ok": true, "trade": trade })))
}

/// DELETE /api/trades/:id
pub async fn delete_trade(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.journal.delete_trade(id).await?;
    Ok(Json(json!({ "ok": true, "deleted": id })))
}
