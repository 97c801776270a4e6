//! HTTP API server for Chatwire.
//!
//! Exposes the message synchronization operations over JSON plus a
//! Server-Sent Events stream for realtime viewers.

mod config;
mod error;
mod routes;
mod state;

use database::Database;
use sync_core::SyncEngine;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Build the sync engine and application state
    let engine = SyncEngine::with_event_buffer(db, config.event_buffer);
    let state = AppState::new(engine);

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
