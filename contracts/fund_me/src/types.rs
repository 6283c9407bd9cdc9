//! # Types
//!
//! Values exchanged with the price feed and returned by the read accessors.
//!
//! ## Funding cycle
//!
//! The ledger has no stored status. Its state is implied by the funder list
//! and the held balance:
//!
//! ```text
//!            fund                 withdraw
//! Settled ─────────► Open ───────────────────► Settled
//!                    │  ▲
//!                    └──┘ fund
//! ```
//!
//! `withdraw` is accepted in either state and always lands in `Settled`.
//! Funding is never closed.

use soroban_sdk::contracttype;

/// A price quote as read from the feed.
///
/// `value` is fixed-point with `decimals` fractional digits, e.g.
/// `200_000_000_000` with `decimals = 8` is 2000 USD per native unit.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Price {
    pub value: i128,
    pub decimals: u32,
}

/// One observation as reported by an aggregator-style feed.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundData {
    pub round_id: u64,
    /// Price at the feed's precision.
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}
