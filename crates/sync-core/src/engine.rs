//! The synchronization facade: ingestion, status transitions, deletion.
//!
//! Every mutation follows the same sequence: validate, persist through
//! the store's atomic per-key primitive, then publish the change event.
//! Publishing happens strictly after the store write returns, and its
//! result is discarded, so a broken subscriber can never fail or roll
//! back a persisted operation.

use database::models::{Message, MessageStatus};
use database::{message, Database};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SyncError};
use crate::events::{EventBus, EventReceiver, SyncEvent};
use crate::payload::PayloadEvent;

/// Candidate record for ingestion, before validation.
///
/// Every field is optional so sparse provider payloads can be carried
/// as-is; [`SyncEngine::ingest`] decides what is actually missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Option<String>,
    pub wa_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub body: Option<String>,
    pub timestamp: Option<i64>,
    pub status: Option<MessageStatus>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub display_name: Option<String>,
}

impl IncomingMessage {
    /// Validate required fields and normalize into a storable record.
    ///
    /// A missing `id` is synthesized as `{wa_id}-{timestamp}` so
    /// re-deliveries of the same provider event stay idempotent. `body`
    /// must be present but may be empty (media without a caption).
    fn into_record(self) -> Result<Message> {
        let wa_id = require(self.wa_id, "wa_id")?;
        let from = require(self.from, "from")?;
        let to = require(self.to, "to")?;
        let body = self.body.ok_or(SyncError::Validation { field: "body" })?;
        let timestamp = self
            .timestamp
            .ok_or(SyncError::Validation { field: "timestamp" })?;

        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => format!("{}-{}", wa_id, timestamp),
        };

        Ok(Message {
            id,
            wa_id,
            from,
            to,
            body,
            timestamp,
            status: self.status.unwrap_or_default(),
            kind: self.kind.unwrap_or_else(|| "text".to_string()),
            display_name: self.display_name,
        })
    }
}

fn require(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SyncError::Validation { field }),
    }
}

/// Entry point for all ingestion, status, and deletion traffic.
///
/// Cheap to clone; clones share the database pool and the broadcast
/// hub.
#[derive(Clone)]
pub struct SyncEngine {
    db: Database,
    events: EventBus,
}

impl SyncEngine {
    /// Default broadcast buffer per subscriber.
    const EVENT_BUFFER: usize = 256;

    pub fn new(db: Database) -> Self {
        Self::with_event_buffer(db, Self::EVENT_BUFFER)
    }

    pub fn with_event_buffer(db: Database, capacity: usize) -> Self {
        Self {
            db,
            events: EventBus::new(capacity),
        }
    }

    /// Ingest a candidate message, creating or replacing by `id`.
    ///
    /// Re-delivery of an already-seen `id` is steady state, not an
    /// error: the record is replaced (latest payload wins) and no
    /// duplicate row is created.
    pub async fn ingest(&self, incoming: IncomingMessage) -> Result<Message> {
        let record = incoming.into_record()?;
        let stored = message::upsert_message(self.db.pool(), &record).await?;
        info!(id = %stored.id, wa_id = %stored.wa_id, "Message ingested");
        self.events.publish(SyncEvent::NewMessage(stored.clone()));
        Ok(stored)
    }

    /// Apply a delivery status reported for an existing message.
    ///
    /// Fails with [`SyncError::NotFound`] when the status event outran
    /// message creation; whether to retry is the caller's call.
    pub async fn update_status(&self, id: &str, status: MessageStatus) -> Result<Message> {
        let updated = message::update_status(self.db.pool(), id, status).await?;
        info!(id = %updated.id, status = status.as_str(), "Status updated");
        self.events.publish(SyncEvent::StatusUpdate {
            id: updated.id.clone(),
            status,
        });
        Ok(updated)
    }

    /// Remove a message permanently.
    pub async fn delete(&self, id: &str) -> Result<()> {
        message::delete_message(self.db.pool(), id).await?;
        info!(id = %id, "Message deleted");
        self.events.publish(SyncEvent::DeleteMessage { id: id.to_string() });
        Ok(())
    }

    /// All messages in conversation order (timestamp ascending).
    pub async fn list(&self) -> Result<Vec<Message>> {
        Ok(message::list_messages(self.db.pool()).await?)
    }

    /// Apply one extracted payload event through the matching engine.
    pub async fn apply(&self, event: PayloadEvent) -> Result<()> {
        match event {
            PayloadEvent::Message(incoming) => {
                self.ingest(incoming).await?;
            }
            PayloadEvent::Status { id, status } => {
                self.update_status(&id, status).await?;
            }
        }
        Ok(())
    }

    /// Hand out a receiver for the realtime event stream.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Number of currently connected realtime subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_engine() -> SyncEngine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        SyncEngine::new(db)
    }

    fn incoming(id: Option<&str>, body: &str, timestamp: i64) -> IncomingMessage {
        IncomingMessage {
            id: id.map(str::to_string),
            wa_id: Some("111".to_string()),
            from: Some("111".to_string()),
            to: Some("999".to_string()),
            body: Some(body.to_string()),
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ingest_defaults() {
        let engine = test_engine().await;
        let stored = engine.ingest(incoming(Some("m1"), "hi", 1000)).await.unwrap();
        assert_eq!(stored.status, MessageStatus::Sent);
        assert_eq!(stored.kind, "text");
        assert!(stored.display_name.is_none());
    }

    #[tokio::test]
    async fn test_ingest_synthesizes_id() {
        let engine = test_engine().await;
        let stored = engine.ingest(incoming(None, "hi", 1000)).await.unwrap();
        assert_eq!(stored.id, "111-1000");

        // Replaying the same id-less payload hits the same identity.
        engine.ingest(incoming(None, "hi", 1000)).await.unwrap();
        assert_eq!(engine.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_idempotent() {
        let engine = test_engine().await;
        engine.ingest(incoming(Some("m1"), "hi", 1000)).await.unwrap();
        engine.ingest(incoming(Some("m1"), "hi", 1000)).await.unwrap();

        let listed = engine.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].body, "hi");
    }

    #[tokio::test]
    async fn test_ingest_last_write_wins() {
        let engine = test_engine().await;
        engine.ingest(incoming(Some("m1"), "first", 1000)).await.unwrap();
        engine.ingest(incoming(Some("m1"), "second", 1000)).await.unwrap();

        let listed = engine.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].body, "second");
    }

    #[tokio::test]
    async fn test_ingest_missing_field_rejected() {
        let engine = test_engine().await;
        let mut bad = incoming(Some("m1"), "hi", 1000);
        bad.from = None;

        let result = engine.ingest(bad).await;
        assert!(matches!(
            result,
            Err(SyncError::Validation { field: "from" })
        ));
        assert!(engine.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_empty_body_allowed() {
        let engine = test_engine().await;
        let stored = engine.ingest(incoming(Some("m1"), "", 1000)).await.unwrap();
        assert_eq!(stored.body, "");
    }

    #[tokio::test]
    async fn test_status_unknown_id() {
        let engine = test_engine().await;
        let result = engine.update_status("missing", MessageStatus::Read).await;
        assert!(matches!(result, Err(SyncError::NotFound { .. })));
        assert!(engine.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_events_published_in_order() {
        let engine = test_engine().await;
        let mut rx = engine.subscribe();

        engine.ingest(incoming(Some("m1"), "hi", 1000)).await.unwrap();
        engine
            .update_status("m1", MessageStatus::Delivered)
            .await
            .unwrap();
        engine.delete("m1").await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind(), "new-message");
        match first {
            SyncEvent::NewMessage(msg) => assert_eq!(msg.id, "m1"),
            other => panic!("unexpected event: {:?}", other),
        }

        let second = rx.recv().await.unwrap();
        assert_eq!(
            second,
            SyncEvent::StatusUpdate {
                id: "m1".to_string(),
                status: MessageStatus::Delivered,
            }
        );

        let third = rx.recv().await.unwrap();
        assert_eq!(
            third,
            SyncEvent::DeleteMessage {
                id: "m1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_full_scenario() {
        let engine = test_engine().await;

        engine.ingest(incoming(Some("m1"), "hi", 1000)).await.unwrap();
        let listed = engine.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, MessageStatus::Sent);

        engine
            .update_status("m1", MessageStatus::Delivered)
            .await
            .unwrap();
        let listed = engine.list().await.unwrap();
        assert_eq!(listed[0].status, MessageStatus::Delivered);

        engine.delete("m1").await.unwrap();
        assert!(engine.list().await.unwrap().is_empty());

        let result = engine.update_status("m1", MessageStatus::Read).await;
        assert!(matches!(result, Err(SyncError::NotFound { .. })));
    }
}
