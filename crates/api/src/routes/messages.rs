//! Message routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use sync_core::{IncomingMessage, Message, MessageStatus};

use crate::error::Result;
use crate::state::AppState;

/// List all messages in conversation order.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Message>>> {
    Ok(Json(state.engine.list().await?))
}

/// Ingest a message. Idempotent on `id`: re-posting an already-seen
/// message replaces it and still answers 201.
pub async fn create(
    State(state): State<AppState>,
    Json(incoming): Json<IncomingMessage>,
) -> Result<(StatusCode, Json<Message>)> {
    let stored = state.engine.ingest(incoming).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Request body for status updates.
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: MessageStatus,
}

/// Update the delivery status of a message.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Message>> {
    let updated = state.engine.update_status(&id, req.status).await?;
    Ok(Json(updated))
}

/// Delete a message.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.engine.delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}
