//! Database layer: migrations, event queries and cursor management.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::Result;
use crate::events::{EventRecord, FundMeEvent};

const EVENT_COLUMNS: &str = "id, event_type, actor, amount, usd_value, ledger, timestamp, \
                             contract_id, tx_hash, event_id, created_at";

/// Open (creating if needed) the SQLite database and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Last-seen ledger, or `0` when nothing has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger and the pagination cursor, if any.
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Pagination cursor saved by the previous poll.
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events in one transaction.
///
/// Re-delivered events (same `event_id`) are ignored.
/// Returns how many rows were actually inserted.
pub async fn insert_events(pool: &SqlitePool, events: &[FundMeEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_type, actor, amount, usd_value, ledger, timestamp, contract_id, tx_hash,
                 event_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ev.event_type)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.usd_value)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .bind(&ev.event_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }

    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Events whose actor is `address`, in ledger order.
pub async fn get_events_for_actor(pool: &SqlitePool, address: &str) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE actor = ?1 ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(address)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// All events, in ledger order.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        // One connection: every new in-memory connection is a fresh database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    fn funded(actor: &str, amount: &str, ledger: i64, tx: &str) -> FundMeEvent {
        FundMeEvent {
            event_id: format!("{ledger}-{tx}"),
            event_type: "funded".to_string(),
            actor: Some(actor.to_string()),
            amount: Some(amount.to_string()),
            usd_value: Some("2000000000000000000000".to_string()),
            ledger,
            timestamp: 1_704_067_200,
            contract_id: "CFUNDME".to_string(),
            tx_hash: Some(tx.to_string()),
        }
    }

    #[tokio::test]
    async fn insert_is_idempotent() {
        let pool = memory_pool().await;
        let batch = vec![
            funded("GALICE", "100", 10, "TX1"),
            funded("GBOB", "50", 11, "TX2"),
        ];

        assert_eq!(insert_events(&pool, &batch).await.unwrap(), 2);
        assert_eq!(insert_events(&pool, &batch).await.unwrap(), 0);
        assert_eq!(get_all_events(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn redelivery_without_tx_hash_is_ignored() {
        let pool = memory_pool().await;
        let mut event = funded("GALICE", "100", 10, "TX1");
        event.tx_hash = None;

        assert_eq!(insert_events(&pool, &[event.clone()]).await.unwrap(), 1);
        assert_eq!(insert_events(&pool, &[event]).await.unwrap(), 0);

        let stored = get_all_events(&pool).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].tx_hash, None);
        assert_eq!(stored[0].event_id, "10-TX1");
    }

    #[tokio::test]
    async fn events_filter_by_actor_in_ledger_order() {
        let pool = memory_pool().await;
        let batch = vec![
            funded("GALICE", "30", 12, "TX3"),
            funded("GBOB", "50", 11, "TX2"),
            funded("GALICE", "100", 10, "TX1"),
        ];
        insert_events(&pool, &batch).await.unwrap();

        let alice = get_events_for_actor(&pool, "GALICE").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].ledger, 10);
        assert_eq!(alice[1].amount.as_deref(), Some("30"));
    }

    #[tokio::test]
    async fn cursor_round_trip() {
        let pool = memory_pool().await;
        assert_eq!(get_last_ledger(&pool).await.unwrap(), 0);
        assert_eq!(get_cursor_string(&pool).await.unwrap(), None);

        save_cursor(&pool, 4242, Some("0004242-0000000001")).await.unwrap();

        assert_eq!(get_last_ledger(&pool).await.unwrap(), 4242);
        assert_eq!(
            get_cursor_string(&pool).await.unwrap().as_deref(),
            Some("0004242-0000000001")
        );
    }
}
