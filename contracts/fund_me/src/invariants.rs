#![allow(dead_code)]

extern crate std;

use std::vec::Vec;

use soroban_sdk::Address;

use crate::{Error, FundMeClient};

/// INV-1: After a withdrawal nothing is held and no funder is remembered.
pub fn assert_settled(client: &FundMeClient, prior_funders: &[Address]) {
    assert_eq!(client.balance(), 0, "INV-1 violated: balance not drained");
    assert_eq!(
        client.funder_count(),
        0,
        "INV-1 violated: funder list not cleared"
    );
    assert_eq!(
        client.try_funder_at(&0),
        Err(Ok(Error::IndexOutOfRange)),
        "INV-1 violated: funder_at(0) still resolves"
    );
    for funder in prior_funders {
        assert_eq!(
            client.amount_funded_by(funder),
            0,
            "INV-1 violated: amount not cleared"
        );
    }
}

/// INV-2: An accepted contribution moves both the funder total and the
/// aggregate balance by exactly `amount`.
pub fn assert_fund_invariant(
    funded_before: i128,
    funded_after: i128,
    balance_before: i128,
    balance_after: i128,
    amount: i128,
) {
    assert_eq!(
        funded_after,
        funded_before + amount,
        "INV-2 violated: funder total {} + {} != {}",
        funded_before,
        amount,
        funded_after
    );
    assert_eq!(
        balance_after,
        balance_before + amount,
        "INV-2 violated: balance {} + {} != {}",
        balance_before,
        amount,
        balance_after
    );
}

/// INV-3: Every listed funder has a positive total, and the distinct
/// funders' totals add up to the held balance.
pub fn assert_ledger_consistent(client: &FundMeClient) {
    let mut distinct: Vec<Address> = Vec::new();
    for index in 0..client.funder_count() {
        let funder = client.funder_at(&index);
        assert!(
            client.amount_funded_by(&funder) > 0,
            "INV-3 violated: listed funder at {} has no amount",
            index
        );
        if !distinct.contains(&funder) {
            distinct.push(funder);
        }
    }

    let total: i128 = distinct.iter().map(|f| client.amount_funded_by(f)).sum();
    assert_eq!(
        total,
        client.balance(),
        "INV-3 violated: funder totals {} != balance {}",
        total,
        client.balance()
    );
}

/// INV-4: Deploy-time configuration never changes.
pub fn assert_config_unchanged(client: &FundMeClient, owner: &Address, price_feed: &Address) {
    assert_eq!(&client.get_owner(), owner, "INV-4 violated: owner changed");
    assert_eq!(
        &client.get_price_feed(),
        price_feed,
        "INV-4 violated: price feed changed"
    );
}
