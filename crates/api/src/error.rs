//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sync_core::SyncError;
use thiserror::Error;

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Sync engine error.
    #[error("{0}")]
    Sync(#[from] SyncError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Sync(err) = self;
        let status = match &err {
            SyncError::Validation { .. } => StatusCode::BAD_REQUEST,
            SyncError::NotFound { .. } => StatusCode::NOT_FOUND,
            SyncError::Store(store_err) => {
                tracing::error!("Store error: {}", store_err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": err.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
