//! Background task that polls the Soroban RPC and writes decoded FundMe
//! events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next poll starts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Position {
    ledger: u32,
    cursor: Option<String>,
}

/// Run the polling loop forever. Poll errors are logged and the loop carries on.
pub async fn run(state: Arc<IndexerState>) {
    info!(
        "Indexer starting: contract {} on {:?}",
        state.config.contract_id, state.config.network
    );

    let mut position = resume_position(&state).await;
    info!("Resuming from ledger {}", position.ledger);

    loop {
        match poll_once(&state, &position).await {
            Ok(next) => position = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)).await;
    }
}

async fn resume_position(state: &IndexerState) -> Position {
    let last_ledger = db::get_last_ledger(&state.pool).await.unwrap_or(0);
    let cursor = db::get_cursor_string(&state.pool).await.unwrap_or(None);

    Position {
        ledger: if last_ledger > 0 {
            last_ledger as u32
        } else {
            state.config.start_ledger
        },
        cursor,
    }
}

/// Fetch one page, store it, and persist the new position.
async fn poll_once(state: &IndexerState, position: &Position) -> Result<Position> {
    let config = &state.config;
    let page = rpc::fetch_events(
        &state.client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            "Polled {} raw events, {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next = next_position(position, page.cursor, page.latest_ledger);

    // Persist so restarts resume deterministically.
    db::save_cursor(&state.pool, next.ledger as i64, next.cursor.as_deref()).await?;
    Ok(next)
}

/// The cursor, when present, continues pagination; the ledger only ever
/// moves forward to the latest ledger the RPC reported.
fn next_position(current: &Position, cursor: Option<String>, latest_ledger: Option<u64>) -> Position {
    let ledger = latest_ledger
        .map(|l| u32::try_from(l).unwrap_or(u32::MAX).max(current.ledger))
        .unwrap_or(current.ledger);
    Position { ledger, cursor }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ledger: u32) -> Position {
        Position {
            ledger,
            cursor: None,
        }
    }

    #[test]
    fn advances_to_latest_ledger() {
        let next = next_position(&at(100), Some("c1".into()), Some(150));
        assert_eq!(next.ledger, 150);
        assert_eq!(next.cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn never_moves_backwards() {
        assert_eq!(next_position(&at(100), None, Some(90)).ledger, 100);
    }

    #[test]
    fn keeps_ledger_without_report() {
        assert_eq!(next_position(&at(100), None, None), at(100));
    }
}
