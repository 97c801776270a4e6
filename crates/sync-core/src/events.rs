//! Broadcast hub for realtime viewer updates.
//!
//! Delivery is best effort and at-most-once: publishing with zero
//! subscribers is normal, there is no replay for late joiners, and a
//! lagging subscriber drops events rather than blocking writers.

use database::models::{Message, MessageStatus};
use serde::Serialize;
use tokio::sync::broadcast;

/// A change notification published to all connected subscribers.
///
/// Serializes to the payload alone; the event name travels separately
/// (see [`SyncEvent::kind`]), matching what viewers subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SyncEvent {
    /// A message was created or replaced; carries the full record.
    NewMessage(Message),
    /// A delivery status changed.
    StatusUpdate { id: String, status: MessageStatus },
    /// A message was removed.
    DeleteMessage { id: String },
}

impl SyncEvent {
    /// Wire name of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::NewMessage(_) => "new-message",
            SyncEvent::StatusUpdate { .. } => "status-update",
            SyncEvent::DeleteMessage { .. } => "delete-message",
        }
    }
}

pub type EventReceiver = broadcast::Receiver<SyncEvent>;

/// Registry of connected realtime subscribers.
///
/// Owned by the sync engine rather than living as a global; handlers
/// subscribe through the engine and publishers never learn who is
/// listening.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.tx.subscribe()
    }

    /// Fire-and-forget publish. A send error only means no subscriber
    /// is currently connected.
    pub fn publish(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new(8);
        bus.publish(SyncEvent::DeleteMessage {
            id: "m1".to_string(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_all_subscribers_receive() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(SyncEvent::StatusUpdate {
            id: "m1".to_string(),
            status: MessageStatus::Read,
        });

        let got_a = a.recv().await.unwrap();
        let got_b = b.recv().await.unwrap();
        assert_eq!(got_a, got_b);
        assert_eq!(got_a.kind(), "status-update");
    }

    #[test]
    fn test_event_payload_shapes() {
        let status = SyncEvent::StatusUpdate {
            id: "m1".to_string(),
            status: MessageStatus::Delivered,
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({ "id": "m1", "status": "delivered" })
        );

        let delete = SyncEvent::DeleteMessage {
            id: "m1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            serde_json::json!({ "id": "m1" })
        );
    }
}
