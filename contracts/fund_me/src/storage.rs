//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by FundMe.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type      | Description                              |
//! |---------------|-----------|------------------------------------------|
//! | `Owner`       | `Address` | Withdrawal recipient, fixed at deploy    |
//! | `PriceFeed`   | `Address` | Native/USD feed, fixed at deploy         |
//! | `NativeToken` | `Address` | Asset contract of the native currency    |
//! | `FunderCount` | `u32`     | Length of the funder list                |
//! | `Cycle`       | `u32`     | Funding cycle, bumped by every withdrawal |
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                            | Type      | Description                        |
//! |--------------------------------|-----------|------------------------------------|
//! | `Funder(cycle, index)`         | `Address` | Funder list entry                  |
//! | `AmountFunded(cycle, address)` | `i128`    | Cumulative contribution this cycle |
//!
//! The funder list is stored one entry per key so that a contribution only
//! writes the new slot, not the whole list.
//!
//! Persistent keys carry the cycle they belong to. A withdrawal moves to the
//! next cycle and zeroes the count, which leaves every earlier entry
//! unreachable in a constant number of writes. Unreachable entries are never
//! bumped again and lapse with their TTL.

use soroban_sdk::{contracttype, Address, Env};

use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Owner identity (Instance).
    Owner,
    /// Price feed contract (Instance).
    PriceFeed,
    /// Native asset contract (Instance).
    NativeToken,
    /// Number of entries in the funder list (Instance).
    FunderCount,
    /// Current funding cycle (Instance).
    Cycle,
    /// Funder list entry by cycle and position (Persistent).
    Funder(u32, u32),
    /// Cumulative amount contributed by an address in a cycle (Persistent).
    AmountFunded(u32, Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Write the deploy-time configuration. Only the constructor calls this.
pub fn init(env: &Env, owner: &Address, price_feed: &Address, native_token: &Address) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Owner, owner);
    instance.set(&DataKey::PriceFeed, price_feed);
    instance.set(&DataKey::NativeToken, native_token);
    instance.set(&DataKey::FunderCount, &0u32);
    instance.set(&DataKey::Cycle, &0u32);
    bump_instance(env);
}

pub fn get_owner(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .expect("owner not set")
}

pub fn get_price_feed(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::PriceFeed)
        .expect("price feed not set")
}

pub fn get_native_token(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::NativeToken)
        .expect("native token not set")
}

pub fn funder_count(env: &Env) -> u32 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::FunderCount)
        .unwrap_or(0)
}

fn cycle(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::Cycle).unwrap_or(0)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Funder list entry at `index`, or `None` past the end.
pub fn funder_at(env: &Env, index: u32) -> Option<Address> {
    if index >= funder_count(env) {
        return None;
    }
    let key = DataKey::Funder(cycle(env), index);
    let funder: Option<Address> = env.storage().persistent().get(&key);
    if funder.is_some() {
        bump_persistent(env, &key);
    }
    funder
}

/// Cumulative amount `funder` contributed since the last withdrawal.
pub fn amount_funded_by(env: &Env, funder: &Address) -> i128 {
    let key = DataKey::AmountFunded(cycle(env), funder.clone());
    match env.storage().persistent().get::<_, i128>(&key) {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

/// Add `amount` to `funder`'s total and append `funder` to the list.
///
/// The list entry is appended on every call, so repeat funders appear once
/// per contribution.
pub fn record_contribution(env: &Env, funder: &Address, amount: i128) -> Result<(), Error> {
    let cycle = cycle(env);
    let amount_key = DataKey::AmountFunded(cycle, funder.clone());
    let total = amount_funded_by(env, funder)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;

    let index = funder_count(env);
    let next = index.checked_add(1).ok_or(Error::Overflow)?;
    let funder_key = DataKey::Funder(cycle, index);

    env.storage().persistent().set(&amount_key, &total);
    bump_persistent(env, &amount_key);
    env.storage().persistent().set(&funder_key, funder);
    bump_persistent(env, &funder_key);
    env.storage().instance().set(&DataKey::FunderCount, &next);
    Ok(())
}

/// Start a new cycle with an empty funder list. Returns how many list
/// entries the closed cycle held.
pub fn reset_funders(env: &Env) -> Result<u32, Error> {
    let count = funder_count(env);
    let next = cycle(env).checked_add(1).ok_or(Error::Overflow)?;

    let instance = env.storage().instance();
    instance.set(&DataKey::Cycle, &next);
    instance.set(&DataKey::FunderCount, &0u32);
    Ok(count)
}
