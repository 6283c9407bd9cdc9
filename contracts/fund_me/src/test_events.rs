extern crate std;

use mock_price_feed::{MockPriceFeed, DECIMALS, INITIAL_ANSWER};
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    token, vec, Address, Env, IntoVal, Symbol, TryIntoVal,
};

use crate::events::{Deployed, Funded, Withdrawn};
use crate::{FundMe, FundMeClient};

const UNIT: i128 = 10_000_000;

fn setup() -> (Env, FundMeClient<'static>, Address, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let owner = Address::generate(&env);
    let feed = env.register(MockPriceFeed, (DECIMALS, INITIAL_ANSWER));
    let native = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(FundMe, (owner.clone(), feed.clone(), native.clone()));
    let client = FundMeClient::new(&env, &contract_id);
    (env, client, owner, feed, native)
}

#[test]
fn test_deployed_event() {
    let (env, client, owner, feed, native) = setup();

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![&env, symbol_short!("deployed").into_val(&env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: Deployed = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        Deployed {
            owner,
            price_feed: feed,
            native_token: native,
        }
    );
}

#[test]
fn test_funded_event() {
    let (env, client, _owner, _feed, native) = setup();
    let funder = Address::generate(&env);
    token::StellarAssetClient::new(&env, &native).mint(&funder, &UNIT);

    client.fund(&funder, &UNIT);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("funded"), funder)
    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("funded").into_val(&env),
        funder.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: Funded = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        Funded {
            funder: funder.clone(),
            amount: UNIT,
            usd_value: 2_000 * 1_000_000_000_000_000_000,
        }
    );
}

#[test]
fn test_withdrawn_event() {
    let (env, client, owner, _feed, native) = setup();
    let sac = token::StellarAssetClient::new(&env, &native);
    for _ in 0..3 {
        let funder = Address::generate(&env);
        sac.mint(&funder, &UNIT);
        client.fund(&funder, &UNIT);
    }

    client.withdraw(&owner);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("withdrawn"), owner)
    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("withdrawn").into_val(&env),
        owner.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: Withdrawn = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        Withdrawn {
            owner: owner.clone(),
            amount: 3 * UNIT,
            funder_count: 3,
        }
    );
}

#[test]
fn test_rejected_fund_emits_nothing() {
    let (env, client, _owner, _feed, native) = setup();
    let funder = Address::generate(&env);
    token::StellarAssetClient::new(&env, &native).mint(&funder, &UNIT);

    assert!(client.try_fund(&funder, &(UNIT / 1_000)).is_err());

    for (contract, topics, _data) in env.events().all().iter() {
        if contract == client.address {
            let first: Symbol = topics.get(0).expect("topic").try_into_val(&env).unwrap();
            assert_ne!(first, symbol_short!("funded"));
        }
    }
}
