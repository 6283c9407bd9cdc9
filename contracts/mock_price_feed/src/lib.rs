//! # Mock Price Feed
//!
//! Aggregator-style price feed deployed on local and development networks
//! in place of a live oracle. It exposes the same read surface that
//! `fund_me::price_feed` binds to (`decimals` + `latest_round_data`), plus
//! setters so tests and local scripts can move the price.
//!
//! | Entry point           | Purpose                                         |
//! |-----------------------|-------------------------------------------------|
//! | `__constructor`       | Fix `decimals`, record round 1 with the answer  |
//! | `latest_round_data`   | Latest [`RoundData`]                            |
//! | `get_round_data`      | Any recorded round by id                        |
//! | `update_answer`       | Start a new round with a new answer             |
//! | `update_round_data`   | Overwrite a round and make it the latest        |
//!
//! There is no access control: anyone may move the price. Never deploy this
//! contract where a real feed exists.

#![no_std]

use soroban_sdk::{contract, contractimpl, contracttype, Env, String};

#[cfg(test)]
mod test;

/// Fractional digits used by development deployments.
pub const DECIMALS: u32 = 8;

/// 2000.00000000 USD per native unit at `DECIMALS` precision.
pub const INITIAL_ANSWER: i128 = 200_000_000_000;

const VERSION: u32 = 0;

const DAY_IN_LEDGERS: u32 = 17_280;
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

/// One price observation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundData {
    pub round_id: u64,
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Fixed fractional digits of every answer (Instance).
    Decimals,
    /// Id of the most recent round (Instance).
    LatestRound,
    /// Round data keyed by round id (Persistent).
    Round(u64),
}

#[contract]
pub struct MockPriceFeed;

#[contractimpl]
impl MockPriceFeed {
    /// Fix the feed precision and record `initial_answer` as round 1.
    pub fn __constructor(env: Env, decimals: u32, initial_answer: i128) {
        env.storage().instance().set(&DataKey::Decimals, &decimals);
        let now = env.ledger().timestamp();
        write_round(&env, 1, initial_answer, now, now);
    }

    pub fn decimals(env: Env) -> u32 {
        bump_instance(&env);
        env.storage()
            .instance()
            .get(&DataKey::Decimals)
            .unwrap_or(DECIMALS)
    }

    pub fn version(_env: Env) -> u32 {
        VERSION
    }

    pub fn description(env: Env) -> String {
        String::from_str(&env, "mock native/USD price feed")
    }

    pub fn latest_round(env: Env) -> u64 {
        latest_round_id(&env)
    }

    pub fn latest_answer(env: Env) -> i128 {
        Self::latest_round_data(env).answer
    }

    pub fn latest_timestamp(env: Env) -> u64 {
        Self::latest_round_data(env).updated_at
    }

    /// Return the most recent round.
    pub fn latest_round_data(env: Env) -> RoundData {
        let id = latest_round_id(&env);
        read_round(&env, id).expect("latest round missing")
    }

    /// Return round `round_id`, or `None` if it was never recorded.
    pub fn get_round_data(env: Env, round_id: u64) -> Option<RoundData> {
        read_round(&env, round_id)
    }

    /// Record `answer` as a new round stamped with the current ledger time.
    pub fn update_answer(env: Env, answer: i128) {
        let next = latest_round_id(&env) + 1;
        let now = env.ledger().timestamp();
        write_round(&env, next, answer, now, now);
    }

    /// Overwrite round `round_id` with explicit timestamps and make it the latest.
    pub fn update_round_data(
        env: Env,
        round_id: u64,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    ) {
        write_round(&env, round_id, answer, started_at, timestamp);
    }
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn latest_round_id(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::LatestRound)
        .unwrap_or(0)
}

fn read_round(env: &Env, round_id: u64) -> Option<RoundData> {
    let key = DataKey::Round(round_id);
    let round: Option<RoundData> = env.storage().persistent().get(&key);
    if round.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
    }
    round
}

fn write_round(env: &Env, round_id: u64, answer: i128, started_at: u64, updated_at: u64) {
    let key = DataKey::Round(round_id);
    let round = RoundData {
        round_id,
        answer,
        started_at,
        updated_at,
        answered_in_round: round_id,
    };
    env.storage().persistent().set(&key, &round);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
    env.storage().instance().set(&DataKey::LatestRound, &round_id);
    bump_instance(env);
}
