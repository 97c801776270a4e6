//! Batch repair operations for legacy data defects.
//!
//! Rows imported before identity enforcement may lack an `id` or a
//! `from`/`to` direction, and exact duplicates may exist from the same
//! era. Each step here is a single idempotent statement: re-running a
//! step against a clean store changes nothing. The pass never creates
//! new logical messages, it only normalizes and prunes.
//!
//! Runs offline by contract. Against live traffic the duplicate scan
//! may miss newly inserted duplicates, but it never corrupts data.

use sqlx::SqlitePool;

use crate::Result;

/// Counts of changes applied by a repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Rows that received a backfilled `id`.
    pub ids_backfilled: u64,
    /// Rows that received a backfilled `from`/`to` direction.
    pub directions_backfilled: u64,
    /// Duplicate rows removed.
    pub duplicates_removed: u64,
}

/// Assign an `id` to every row lacking one, derived from its storage
/// identity, so the row becomes addressable and future-idempotent.
pub async fn backfill_ids(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET id = CAST(rowid AS TEXT)
        WHERE id IS NULL
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Fill in direction for rows lacking a `from`: assume the message
/// originated from its contact and was addressed to the platform.
pub async fn backfill_direction(pool: &SqlitePool, platform_wa_id: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET "from" = wa_id, "to" = ?
        WHERE "from" IS NULL
        "#,
    )
    .bind(platform_wa_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Collapse exact duplicates: rows sharing `(wa_id, body, timestamp)`
/// keep only the first stored row (smallest rowid). Returns the number
/// of rows removed.
pub async fn collapse_duplicates(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM messages
        WHERE rowid NOT IN (
            SELECT MIN(rowid)
            FROM messages
            GROUP BY wa_id, body, timestamp
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Run all repair steps in order and report what changed.
pub async fn run(pool: &SqlitePool, platform_wa_id: &str) -> Result<RepairReport> {
    let ids_backfilled = backfill_ids(pool).await?;
    let directions_backfilled = backfill_direction(pool, platform_wa_id).await?;
    let duplicates_removed = collapse_duplicates(pool).await?;

    let report = RepairReport {
        ids_backfilled,
        directions_backfilled,
        duplicates_removed,
    };

    tracing::info!(
        ids_backfilled = report.ids_backfilled,
        directions_backfilled = report.directions_backfilled,
        duplicates_removed = report.duplicates_removed,
        "Repair pass complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, MessageStatus};
    use crate::{message, Database};

    const PLATFORM: &str = "919999999999";

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    /// Insert a legacy-shaped row directly, bypassing the live path.
    async fn insert_legacy(
        pool: &SqlitePool,
        id: Option<&str>,
        wa_id: &str,
        from: Option<&str>,
        body: &str,
        timestamp: i64,
    ) {
        sqlx::query(
            r#"
            INSERT INTO messages (id, wa_id, "from", "to", body, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(wa_id)
        .bind(from)
        .bind(from.map(|_| PLATFORM))
        .bind(body)
        .bind(timestamp)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_backfill_ids() {
        let db = test_db().await;
        insert_legacy(db.pool(), None, "111", Some("111"), "hi", 1000).await;
        insert_legacy(db.pool(), Some("m2"), "111", Some("111"), "yo", 2000).await;

        let changed = backfill_ids(db.pool()).await.unwrap();
        assert_eq!(changed, 1);

        // Every row is now addressable by id.
        let missing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE id IS NULL")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }

    #[tokio::test]
    async fn test_backfill_direction() {
        let db = test_db().await;
        insert_legacy(db.pool(), Some("m1"), "111", None, "hi", 1000).await;

        let changed = backfill_direction(db.pool(), PLATFORM).await.unwrap();
        assert_eq!(changed, 1);

        let repaired = message::get_message(db.pool(), "m1").await.unwrap();
        assert_eq!(repaired.from, "111");
        assert_eq!(repaired.to, PLATFORM);
    }

    #[tokio::test]
    async fn test_collapse_duplicates_keeps_first() {
        let db = test_db().await;
        // Three copies of the same logical message, distinct identities.
        insert_legacy(db.pool(), Some("m1"), "111", Some("111"), "hi", 1000).await;
        insert_legacy(db.pool(), Some("m1-copy"), "111", Some("111"), "hi", 1000).await;
        insert_legacy(db.pool(), Some("m1-copy2"), "111", Some("111"), "hi", 1000).await;
        // An unrelated message survives untouched.
        insert_legacy(db.pool(), Some("m2"), "111", Some("111"), "bye", 2000).await;

        let removed = collapse_duplicates(db.pool()).await.unwrap();
        assert_eq!(removed, 2);

        let remaining = message::list_messages(db.pool()).await.unwrap();
        let ids: Vec<&str> = remaining.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let db = test_db().await;
        insert_legacy(db.pool(), None, "111", None, "hi", 1000).await;
        insert_legacy(db.pool(), Some("m1-copy"), "111", Some("111"), "hi", 1000).await;
        insert_legacy(db.pool(), Some("m2"), "222", Some("222"), "hello", 2000).await;

        let first = run(db.pool(), PLATFORM).await.unwrap();
        assert_eq!(first.ids_backfilled, 1);
        assert_eq!(first.directions_backfilled, 1);
        assert_eq!(first.duplicates_removed, 1);

        // A second pass finds nothing left to fix.
        let second = run(db.pool(), PLATFORM).await.unwrap();
        assert_eq!(second, RepairReport::default());
    }

    #[tokio::test]
    async fn test_run_noop_on_clean_store() {
        let db = test_db().await;
        let clean = Message {
            id: "m1".to_string(),
            wa_id: "111".to_string(),
            from: "111".to_string(),
            to: PLATFORM.to_string(),
            body: "hi".to_string(),
            timestamp: 1000,
            status: MessageStatus::Sent,
            kind: "text".to_string(),
            display_name: None,
        };
        message::upsert_message(db.pool(), &clean).await.unwrap();

        let report = run(db.pool(), PLATFORM).await.unwrap();
        assert_eq!(report, RepairReport::default());
        assert_eq!(message::count_messages(db.pool()).await.unwrap(), 1);
    }
}
