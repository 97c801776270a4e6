//! Application state shared across handlers.

use sync_core::SyncEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The synchronization engine.
    pub engine: SyncEngine,
}

impl AppState {
    /// Create new application state.
    pub fn new(engine: SyncEngine) -> Self {
        Self { engine }
    }
}
