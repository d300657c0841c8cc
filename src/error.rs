//! # error
//!
//! Centralised application error type.
//!
//! Every handler returns `Result<_, AppError>`.  Axum's `IntoResponse` impl
//! converts these into `{ "ok": false, "error": "..." }` bodies so the UI
//! can always show a message, even on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::engine::{analytics::AnalyticsError, csv_import::ImportError};

#[derive(Debug, Error)]
pub enum AppError {
    /// The request payload was syntactically correct but semantically invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The requested trade does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored trades cannot be aggregated (non-finite P&L).
    #[error("Invalid analytics input: {0}")]
    InvalidInput(#[from] AnalyticsError),

    /// CSV header missing or unusable — the whole import is rejected.
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// Catch-all for unexpected failures (storage, database).
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_)   => StatusCode::BAD_REQUEST,
            AppError::NotFound(_)     => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Import(_)       => StatusCode::BAD_REQUEST,
            AppError::Internal(_)     => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Internal(err) => {
                error!(error = ?err, "request failed");
                format!("Internal error: {err}")
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
