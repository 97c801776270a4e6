//! Message store operations.
//!
//! The upsert is the only write path for new messages: a single atomic
//! `INSERT .. ON CONFLICT .. RETURNING` statement keyed on `id`, so
//! concurrent deliveries of the same message never interleave partial
//! writes and never produce a second row.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Message, MessageStatus};

/// Insert a message, or replace all mutable fields if the `id` is
/// already stored (latest payload wins). Returns the stored record.
pub async fn upsert_message(pool: &SqlitePool, message: &Message) -> Result<Message> {
    let stored = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (id, wa_id, "from", "to", body, timestamp, status, type, display_name)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            wa_id = excluded.wa_id,
            "from" = excluded."from",
            "to" = excluded."to",
            body = excluded.body,
            timestamp = excluded.timestamp,
            status = excluded.status,
            type = excluded.type,
            display_name = excluded.display_name
        RETURNING id, wa_id, "from", "to", body, timestamp, status, type, display_name
        "#,
    )
    .bind(&message.id)
    .bind(&message.wa_id)
    .bind(&message.from)
    .bind(&message.to)
    .bind(&message.body)
    .bind(message.timestamp)
    .bind(message.status)
    .bind(&message.kind)
    .bind(&message.display_name)
    .fetch_one(pool)
    .await?;

    Ok(stored)
}

/// Get a message by ID.
pub async fn get_message(pool: &SqlitePool, id: &str) -> Result<Message> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, wa_id, "from", "to", body, timestamp, status, type, display_name
        FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Message",
        id: id.to_string(),
    })
}

/// List all messages in conversation order (timestamp ascending).
pub async fn list_messages(pool: &SqlitePool) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, wa_id, "from", "to", body, timestamp, status, type, display_name
        FROM messages
        ORDER BY timestamp
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Set the delivery status of an existing message.
///
/// No ordering validation against the current status: any reported
/// value is stored, and the last write wins.
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: MessageStatus,
) -> Result<Message> {
    sqlx::query_as::<_, Message>(
        r#"
        UPDATE messages
        SET status = ?
        WHERE id = ?
        RETURNING id, wa_id, "from", "to", body, timestamp, status, type, display_name
        "#,
    )
    .bind(status)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Message",
        id: id.to_string(),
    })
}

/// Delete a message by ID.
pub async fn delete_message(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Message",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count total messages.
pub async fn count_messages(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM messages
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
