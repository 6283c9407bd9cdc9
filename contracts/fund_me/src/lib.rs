//! # FundMe Contract
//!
//! A crowdfunding ledger with a USD floor. Anyone may contribute native
//! currency worth at least [`MINIMUM_USD`], priced through an external feed;
//! only the owner may withdraw, and a withdrawal clears every contributor
//! record.
//!
//! | Phase      | Entry Point(s)                                              |
//! |------------|-------------------------------------------------------------|
//! | Deployment | `__constructor`                                             |
//! | Funding    | [`FundMe::fund`]                                            |
//! | Settlement | [`FundMe::withdraw`]                                        |
//! | Queries    | `get_owner`, `get_price_feed`, `amount_funded_by`, `funder_at`, `funder_count`, `balance`, `latest_price`, `conversion_rate` |
//!
//! ## Architecture
//!
//! Price reads and unit conversion live in [`price_feed`]. Storage access is
//! delegated to `storage`. This file holds the entry points, the funding
//! rules and event emission.
//!
//! Every invocation runs to completion before the next one starts, and an
//! entry point that returns `Err` has all of its writes and transfers rolled
//! back by the host. `fund` reads the price and mutates state inside one
//! invocation, so two contributions can never interleave.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, log, token, Address, Env};

pub mod events;
pub mod price_feed;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use types::{Price, RoundData};

/// Smallest accepted contribution: 50 USD at 18 decimals.
pub const MINIMUM_USD: i128 = 50 * 10i128.pow(price_feed::USD_DECIMALS);

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    InsufficientFunding = 1,
    NotOwner            = 2,
    OracleUnavailable   = 3,
    TransferFailed      = 4,
    IndexOutOfRange     = 5,
    Overflow            = 6,
}

#[contract]
pub struct FundMe;

#[contractimpl]
impl FundMe {
    /// Fix the owner, the price feed and the native asset for the lifetime
    /// of the contract.
    pub fn __constructor(env: Env, owner: Address, price_feed: Address, native_token: Address) {
        storage::init(&env, &owner, &price_feed, &native_token);
        events::emit_deployed(&env, &owner, &price_feed, &native_token);
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` native units.
    ///
    /// Rejected with `InsufficientFunding` when the USD value at the current
    /// feed price is below [`MINIMUM_USD`]. On acceptance the amount moves
    /// into the contract, is added to `funder`'s total and `funder` is
    /// appended to the funder list.
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<(), Error> {
        funder.require_auth();

        if amount <= 0 {
            log!(&env, "fund rejected: non-positive amount", amount);
            return Err(Error::InsufficientFunding);
        }

        let token_client = token::Client::new(&env, &storage::get_native_token(&env));
        let price = price_feed::latest_price(&env, &storage::get_price_feed(&env))?;
        let usd_value = price_feed::to_usd(amount, &price, token_client.decimals())?;

        if usd_value < MINIMUM_USD {
            log!(&env, "fund rejected: below minimum", usd_value);
            return Err(Error::InsufficientFunding);
        }

        token_client.transfer(&funder, &env.current_contract_address(), &amount);
        storage::record_contribution(&env, &funder, amount)?;

        events::emit_funded(&env, &funder, amount, usd_value);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Send the whole balance to the owner and clear every funder record.
    ///
    /// `caller` must be the owner. If the transfer fails the call returns
    /// `TransferFailed` and the reset is rolled back with it.
    pub fn withdraw(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();

        let owner = storage::get_owner(&env);
        if caller != owner {
            log!(&env, "withdraw rejected: caller is not the owner", caller);
            return Err(Error::NotOwner);
        }

        let cleared = storage::reset_funders(&env)?;

        let token_client = token::Client::new(&env, &storage::get_native_token(&env));
        let contract = env.current_contract_address();
        let amount = token_client.balance(&contract);

        if amount > 0 {
            match token_client.try_transfer(&contract, &owner, &amount) {
                Ok(Ok(())) => {}
                _ => {
                    log!(&env, "withdraw failed: transfer to owner rejected", amount);
                    return Err(Error::TransferFailed);
                }
            }
        }

        events::emit_withdrawn(&env, &owner, amount, cleared);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_owner(env: Env) -> Address {
        storage::get_owner(&env)
    }

    pub fn get_price_feed(env: Env) -> Address {
        storage::get_price_feed(&env)
    }

    pub fn get_native_token(env: Env) -> Address {
        storage::get_native_token(&env)
    }

    /// Total contributed by `funder` since the last withdrawal.
    pub fn amount_funded_by(env: Env, funder: Address) -> i128 {
        storage::amount_funded_by(&env, &funder)
    }

    /// Funder list entry at `index`.
    pub fn funder_at(env: Env, index: u32) -> Result<Address, Error> {
        storage::funder_at(&env, index).ok_or(Error::IndexOutOfRange)
    }

    pub fn funder_count(env: Env) -> u32 {
        storage::funder_count(&env)
    }

    /// Native balance currently held by the contract.
    pub fn balance(env: Env) -> i128 {
        let token_client = token::Client::new(&env, &storage::get_native_token(&env));
        token_client.balance(&env.current_contract_address())
    }

    pub fn minimum_usd(_env: Env) -> i128 {
        MINIMUM_USD
    }

    pub fn latest_price(env: Env) -> Result<Price, Error> {
        price_feed::latest_price(&env, &storage::get_price_feed(&env))
    }

    /// USD value (18 decimals) of `amount` native units at the current price.
    pub fn conversion_rate(env: Env, amount: i128) -> Result<i128, Error> {
        let token_client = token::Client::new(&env, &storage::get_native_token(&env));
        let price = price_feed::latest_price(&env, &storage::get_price_feed(&env))?;
        price_feed::to_usd(amount, &price, token_client.decimals())
    }
}
