//! Webhook payload decoding.
//!
//! Provider bundles arrive as deeply nested `entry[].changes[].value`
//! objects mixing new messages, contact profiles, and delivery status
//! notices. Decoding normalizes one bundle into a flat list of
//! [`PayloadEvent`]s before anything reaches the engines, so the
//! engines only ever see explicit, validated shapes.

use database::models::MessageStatus;
use serde::Deserialize;

use crate::engine::IncomingMessage;

/// Top-level webhook bundle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
    /// Some capture files carry status notices at the top level rather
    /// than nested under `value`.
    #[serde(default)]
    pub statuses: Vec<StatusNotice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<PayloadMessage>,
    #[serde(default)]
    pub statuses: Vec<StatusNotice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub wa_id: String,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayloadMessage {
    #[serde(default)]
    pub id: Option<String>,
    /// Providers send this as a numeric string; older captures as a
    /// number.
    #[serde(default, deserialize_with = "de_timestamp")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub text: Option<Text>,
    /// Media messages carry their text as a caption instead.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub body: Option<String>,
}

/// A delivery status notice referencing an earlier message.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusNotice {
    #[serde(default)]
    pub id: Option<String>,
    /// Fallback identity some providers use for status notices.
    #[serde(default)]
    pub meta_msg_id: Option<String>,
    pub status: MessageStatus,
}

impl StatusNotice {
    /// The message identity this notice refers to, if it carries one.
    fn target_id(&self) -> Option<String> {
        self.id.clone().or_else(|| self.meta_msg_id.clone())
    }
}

/// A single normalized event extracted from a bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadEvent {
    /// A new (or re-delivered) inbound message.
    Message(IncomingMessage),
    /// A delivery status change for an earlier message.
    Status { id: String, status: MessageStatus },
}

/// Flatten a webhook bundle into normalized events.
///
/// Message events take their sender from the first listed contact and
/// are addressed to the platform number; notices without any message
/// identity are skipped.
pub fn extract_events(payload: &WebhookPayload, platform_wa_id: &str) -> Vec<PayloadEvent> {
    let mut events = Vec::new();

    for entry in &payload.entry {
        for change in &entry.changes {
            let value = &change.value;

            if let Some(contact) = value.contacts.first() {
                let display_name = contact
                    .profile
                    .as_ref()
                    .and_then(|p| p.name.clone())
                    .or_else(|| contact.name.clone());

                for msg in &value.messages {
                    let body = msg
                        .text
                        .as_ref()
                        .and_then(|t| t.body.clone())
                        .or_else(|| msg.caption.clone())
                        .unwrap_or_default();

                    events.push(PayloadEvent::Message(IncomingMessage {
                        id: msg.id.clone(),
                        wa_id: Some(contact.wa_id.clone()),
                        from: Some(contact.wa_id.clone()),
                        to: Some(platform_wa_id.to_string()),
                        body: Some(body),
                        timestamp: msg.timestamp,
                        status: Some(MessageStatus::Sent),
                        kind: msg.kind.clone(),
                        display_name: display_name.clone(),
                    }));
                }
            }

            for notice in &value.statuses {
                if let Some(id) = notice.target_id() {
                    events.push(PayloadEvent::Status {
                        id,
                        status: notice.status,
                    });
                }
            }
        }
    }

    for notice in &payload.statuses {
        if let Some(id) = notice.target_id() {
            events.push(PayloadEvent::Status {
                id,
                status: notice.status,
            });
        }
    }

    events
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
