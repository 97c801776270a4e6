//! Route handlers for the HTTP API.

pub mod events;
pub mod health;
pub mod messages;

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Message operations
        .route("/api/messages", get(messages::list).post(messages::create))
        .route("/api/messages/:id", delete(messages::delete))
        .route("/api/messages/:id/status", patch(messages::update_status))
        // Realtime event stream
        .route("/api/events", get(events::events))
}
