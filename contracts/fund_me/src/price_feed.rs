//! # Price feed adapter
//!
//! Reads the native/USD rate from an aggregator-style feed contract and
//! converts native amounts into USD at [`USD_DECIMALS`] precision.
//!
//! The feed is only ever read. A feed that cannot be invoked, traps, or
//! reports an empty round surfaces as [`Error::OracleUnavailable`]; the
//! ledger never retries.

use soroban_sdk::{contractclient, Address, Env};

use crate::types::{Price, RoundData};
use crate::Error;

/// Fractional digits of every USD value produced by [`to_usd`].
pub const USD_DECIMALS: u32 = 18;

/// Read surface shared by live feeds and `mock_price_feed`.
#[allow(dead_code)]
#[contractclient(name = "PriceFeedClient")]
pub trait PriceFeedInterface {
    fn decimals(env: Env) -> u32;
    fn latest_round_data(env: Env) -> RoundData;
}

/// Fetch the latest price from `feed`.
pub fn latest_price(env: &Env, feed: &Address) -> Result<Price, Error> {
    let client = PriceFeedClient::new(env, feed);

    let decimals = match client.try_decimals() {
        Ok(Ok(decimals)) => decimals,
        _ => return Err(Error::OracleUnavailable),
    };
    let round = match client.try_latest_round_data() {
        Ok(Ok(round)) => round,
        _ => return Err(Error::OracleUnavailable),
    };

    // Round 0 or a non-positive answer means the feed has no data yet.
    if round.round_id == 0 || round.answer <= 0 {
        return Err(Error::OracleUnavailable);
    }

    Ok(Price {
        value: round.answer,
        decimals,
    })
}

/// USD value of `amount` native units, at [`USD_DECIMALS`] precision.
///
/// `amount * price` carries `native_decimals + price.decimals` fractional
/// digits; the product is rescaled to 18. Scaling down truncates.
pub fn to_usd(amount: i128, price: &Price, native_decimals: u32) -> Result<i128, Error> {
    let raw = amount.checked_mul(price.value).ok_or(Error::Overflow)?;
    let source_decimals = native_decimals
        .checked_add(price.decimals)
        .ok_or(Error::Overflow)?;

    if source_decimals >= USD_DECIMALS {
        let divisor = 10i128
            .checked_pow(source_decimals - USD_DECIMALS)
            .ok_or(Error::Overflow)?;
        Ok(raw / divisor)
    } else {
        let factor = 10i128
            .checked_pow(USD_DECIMALS - source_decimals)
            .ok_or(Error::Overflow)?;
        raw.checked_mul(factor).ok_or(Error::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ETHER: i128 = 1_000_000_000_000_000_000;

    fn eth_usd() -> Price {
        Price {
            value: 200_000_000_000,
            decimals: 8,
        }
    }

    #[test]
    fn one_unit_at_eighteen_decimals() {
        let usd = to_usd(ONE_ETHER, &eth_usd(), 18).unwrap();
        assert_eq!(usd, 2_000 * ONE_ETHER);
    }

    #[test]
    fn thousandth_unit_at_eighteen_decimals() {
        let usd = to_usd(ONE_ETHER / 1_000, &eth_usd(), 18).unwrap();
        assert_eq!(usd, 2 * ONE_ETHER);
        assert!(usd < crate::MINIMUM_USD);
    }

    #[test]
    fn seven_decimal_asset_scales_up() {
        // 1 XLM = 10^7 stroops.
        let usd = to_usd(10_000_000, &eth_usd(), 7).unwrap();
        assert_eq!(usd, 2_000 * ONE_ETHER);
    }

    #[test]
    fn truncates_when_scaling_down() {
        let price = Price {
            value: 3,
            decimals: 10,
        };
        // 1 * 3 at 28 decimals -> 0 at 18.
        assert_eq!(to_usd(1, &price, 18).unwrap(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(to_usd(i128::MAX, &eth_usd(), 18), Err(Error::Overflow));
        let tiny = Price {
            value: 1,
            decimals: 0,
        };
        assert_eq!(to_usd(1, &tiny, 60), Err(Error::Overflow));
    }
}
