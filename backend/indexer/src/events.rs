//! Event types emitted by the FundMe contract, as the indexer stores them.
//!
//! These mirror `contracts/fund_me/src/events.rs`.

use serde::{Deserialize, Serialize};

/// Recognised event kinds from the FundMe contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Contract constructed (`deployed` topic).
    Deployed,
    /// A contribution was accepted (`funded` topic).
    Funded,
    /// The owner withdrew and the ledger was reset (`withdrawn` topic).
    Withdrawn,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "deployed" => Self::Deployed,
            "funded" => Self::Funded,
            "withdrawn" => Self::Withdrawn,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployed => "deployed",
            Self::Funded => "funded",
            Self::Withdrawn => "withdrawn",
            Self::Unknown => "unknown",
        }
    }
}

/// A decoded event, ready to be stored.
///
/// Amounts stay strings: they are `i128` on chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundMeEvent {
    /// RPC event id; unique per emitted event.
    pub event_id: String,
    pub event_type: String,
    /// Funder for `funded`, owner for `deployed` and `withdrawn`.
    pub actor: Option<String>,
    pub amount: Option<String>,
    /// USD value at 18 decimals; `funded` only.
    pub usd_value: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event row as read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub usd_value: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub event_id: String,
    pub created_at: i64,
}
