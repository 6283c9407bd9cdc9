//! # Events
//!
//! | Topic                   | Data        | Emitted by      |
//! |-------------------------|-------------|-----------------|
//! | `("deployed",)`         | [`Deployed`]  | constructor   |
//! | `("funded", funder)`    | [`Funded`]    | `fund`        |
//! | `("withdrawn", owner)`  | [`Withdrawn`] | `withdraw`    |
//!
//! The off-chain indexer keys on the leading symbol and reads the actor from
//! the second topic.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deployed {
    pub owner: Address,
    pub price_feed: Address,
    pub native_token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Funded {
    pub funder: Address,
    pub amount: i128,
    /// Value of `amount` in USD at 18 decimals, at the price used to accept it.
    pub usd_value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdrawn {
    pub owner: Address,
    pub amount: i128,
    /// Funder list entries cleared by this withdrawal.
    pub funder_count: u32,
}

pub fn emit_deployed(env: &Env, owner: &Address, price_feed: &Address, native_token: &Address) {
    env.events().publish(
        (symbol_short!("deployed"),),
        Deployed {
            owner: owner.clone(),
            price_feed: price_feed.clone(),
            native_token: native_token.clone(),
        },
    );
}

pub fn emit_funded(env: &Env, funder: &Address, amount: i128, usd_value: i128) {
    env.events().publish(
        (symbol_short!("funded"), funder.clone()),
        Funded {
            funder: funder.clone(),
            amount,
            usd_value,
        },
    );
}

pub fn emit_withdrawn(env: &Env, owner: &Address, amount: i128, funder_count: u32) {
    env.events().publish(
        (symbol_short!("withdrawn"), owner.clone()),
        Withdrawn {
            owner: owner.clone(),
            amount,
            funder_count,
        },
    );
}
