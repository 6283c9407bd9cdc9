//! Soroban RPC client: polls `getEvents` for the FundMe contract and decodes
//! the results.
//!
//! `getEvents` returns every topic and the event value as base64-encoded
//! `ScVal` XDR. Decoding goes through `stellar-xdr`.
//!
//! ## Resilience
//!
//! * Transport errors, HTTP 429 and soft JSON-RPC errors are retried with
//!   exponential back-off, capped at [`MAX_BACKOFF_SECS`].
//! * Invalid-request / unknown-method errors (-32600, -32601) are not
//!   retryable and surface to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use stellar_xdr::curr::{Int128Parts, Limits, ReadXdr, ScVal};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, FundMeEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// JSON-RPC codes that will fail the same way on every retry.
const HARD_ERROR_CODES: [i64; 2] = [-32600, -32601];

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<EventsResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct EventsResult {
    events: Vec<RawEvent>,
    cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// Topic list, base64 `ScVal` XDR per entry
    pub topic: Vec<String>,
    /// Event data, base64 `ScVal` XDR
    pub value: String,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

/// One page of `getEvents` output.
#[derive(Debug, Default)]
pub struct EventsPage {
    pub events: Vec<RawEvent>,
    /// Opaque cursor to continue from, if the RPC returned one.
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch one page of contract events.
///
/// `cursor` takes precedence over `start_ledger` when present.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventsPage> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });
    let mut backoff = Backoff::new();

    loop {
        let resp = match client.post(rpc_url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                backoff.wait(&format!("RPC request failed: {e}")).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            backoff.wait("Rate-limited by RPC").await;
            continue;
        }

        let parsed: RpcResponse = resp.json().await?;

        if let Some(err) = parsed.error {
            if HARD_ERROR_CODES.contains(&err.code) {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            backoff
                .wait(&format!("RPC soft error {} {}", err.code, err.message))
                .await;
            continue;
        }

        let result = parsed.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventsPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

/// Exponential back-off state for a single `fetch_events` call.
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self, reason: &str) {
        warn!("{reason} (will retry in {}s)", self.secs);
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events into [`FundMeEvent`]s.
///
/// Events from failed invocations are dropped: their state changes were
/// rolled back, so they never happened as far as the ledger is concerned.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<FundMeEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<FundMeEvent> {
    let kind = match decode_xdr(raw.topic.first()?).as_ref().and_then(scval_to_string) {
        Some(topic) => EventKind::from_topic(&topic),
        None => EventKind::Unknown,
    };
    let value = decode_xdr(&raw.value);

    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    // `funded` and `withdrawn` carry the actor as their second topic;
    // `deployed` only has it in the data.
    let actor = raw
        .topic
        .get(1)
        .and_then(|t| decode_xdr(t))
        .as_ref()
        .and_then(scval_to_string)
        .or_else(|| match kind {
            EventKind::Deployed | EventKind::Withdrawn => field_string(value.as_ref(), "owner"),
            EventKind::Funded => field_string(value.as_ref(), "funder"),
            EventKind::Unknown => None,
        });

    let (amount, usd_value) = match kind {
        EventKind::Funded => (
            field_string(value.as_ref(), "amount"),
            field_string(value.as_ref(), "usd_value"),
        ),
        EventKind::Withdrawn => (field_string(value.as_ref(), "amount"), None),
        EventKind::Deployed | EventKind::Unknown => (None, None),
    };

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}-{}-{}-{}",
            raw.tx_hash.as_deref().unwrap_or_default(),
            kind.as_str(),
            actor.as_deref().unwrap_or_default()
        )
    });

    Some(FundMeEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        actor,
        amount,
        usd_value,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

fn decode_xdr(b64: &str) -> Option<ScVal> {
    match ScVal::from_xdr_base64(b64, Limits::none()) {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("Skipping undecodable ScVal {b64:?}: {e}");
            None
        }
    }
}

/// Render the scalar kinds FundMe emits. Anything else is `None`.
fn scval_to_string(val: &ScVal) -> Option<String> {
    match val {
        ScVal::Symbol(sym) => Some(sym.to_utf8_string_lossy()),
        ScVal::String(s) => Some(s.to_utf8_string_lossy()),
        ScVal::Address(addr) => Some(addr.to_string()),
        ScVal::U32(n) => Some(n.to_string()),
        ScVal::U64(n) => Some(n.to_string()),
        ScVal::I128(parts) => Some(i128_from_parts(parts).to_string()),
        _ => None,
    }
}

fn i128_from_parts(parts: &Int128Parts) -> i128 {
    (i128::from(parts.hi) << 64) | i128::from(parts.lo)
}

/// A `#[contracttype]` struct arrives as a map keyed by field-name symbols.
fn field_string(value: Option<&ScVal>, key: &str) -> Option<String> {
    let ScVal::Map(Some(map)) = value? else {
        return None;
    };
    map.iter()
        .find(|entry| matches!(&entry.key, ScVal::Symbol(sym) if sym.to_utf8_string_lossy() == key))
        .and_then(|entry| scval_to_string(&entry.val))
}

/// Parse an RFC 3339 timestamp into Unix seconds.
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
