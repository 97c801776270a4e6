//! Message synchronization engine for Chatwire.
//!
//! This crate is the single entry point for ingestion, delivery-status,
//! and deletion traffic, plus the broadcast hub that fans change events
//! out to connected viewers. The HTTP layer and the batch importer are
//! thin collaborators on top of [`SyncEngine`].
//!
//! # Example
//!
//! ```no_run
//! use database::Database;
//! use sync_core::{IncomingMessage, SyncEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:chatwire.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let engine = SyncEngine::new(db);
//!     let mut updates = engine.subscribe();
//!
//!     let stored = engine
//!         .ingest(IncomingMessage {
//!             id: Some("wamid.HBgMOTE5OTk5OTk5OTk5".to_string()),
//!             wa_id: Some("919937320320".to_string()),
//!             from: Some("919937320320".to_string()),
//!             to: Some("919999999999".to_string()),
//!             body: Some("Hi there!".to_string()),
//!             timestamp: Some(1754400000),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("stored {}", stored.id);
//!
//!     let event = updates.recv().await?;
//!     println!("broadcast: {}", event.kind());
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod events;
pub mod payload;

pub use engine::{IncomingMessage, SyncEngine};
pub use error::{Result, SyncError};
pub use events::{EventBus, EventReceiver, SyncEvent};
pub use payload::{extract_events, PayloadEvent, WebhookPayload};

// The stored record types live in the persistence crate; re-exported
// here so collaborators only need one dependency.
pub use database::models::{Message, MessageStatus};
