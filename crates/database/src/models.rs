//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Delivery lifecycle of a message.
///
/// Stored as lowercase text. Transitions are not enforced: the latest
/// reported value always wins, including downgrades, since provider
/// retries deliver status events out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Accepted by the provider.
    #[default]
    Sent,
    /// Delivered to the recipient's device.
    Delivered,
    /// Read by the recipient.
    Read,
}

impl MessageStatus {
    /// Wire/storage spelling of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }
}

/// One synchronized chat message.
///
/// `id` is the deduplication key: provider-assigned when available,
/// synthesized as `{wa_id}-{timestamp}` otherwise. Everything except
/// `status` is immutable once stored, short of a whole-record replace
/// by re-ingestion of the same `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Globally unique message identity.
    pub id: String,
    /// Conversation/contact identifier.
    pub wa_id: String,
    /// Sender endpoint.
    pub from: String,
    /// Receiver endpoint.
    pub to: String,
    /// Message text; empty for media without a caption.
    pub body: String,
    /// Seconds since epoch, ordering key within a conversation.
    pub timestamp: i64,
    /// Delivery lifecycle state.
    pub status: MessageStatus,
    /// Message kind reported by the provider (e.g. "text", "image").
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Contact profile name, when the payload carried one.
    pub display_name: Option<String>,
}
