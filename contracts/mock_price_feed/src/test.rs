extern crate std;

use soroban_sdk::{testutils::Ledger, Env};

use crate::{MockPriceFeed, MockPriceFeedClient, RoundData, DECIMALS, INITIAL_ANSWER};

fn setup() -> (Env, MockPriceFeedClient<'static>) {
    let env = Env::default();
    let contract_id = env.register(MockPriceFeed, (DECIMALS, INITIAL_ANSWER));
    let client = MockPriceFeedClient::new(&env, &contract_id);
    (env, client)
}

#[test]
fn test_constructor_records_first_round() {
    let (_env, client) = setup();

    assert_eq!(client.decimals(), 8);
    assert_eq!(client.latest_round(), 1);
    assert_eq!(client.latest_answer(), 200_000_000_000);

    let round = client.latest_round_data();
    assert_eq!(round.round_id, 1);
    assert_eq!(round.answered_in_round, 1);
    assert_eq!(round.answer, INITIAL_ANSWER);
}

#[test]
fn test_update_answer_starts_new_round() {
    let (env, client) = setup();
    env.ledger().with_mut(|li| li.timestamp = 1_700_000_000);

    client.update_answer(&250_000_000_000i128);

    assert_eq!(client.latest_round(), 2);
    assert_eq!(client.latest_answer(), 250_000_000_000);
    assert_eq!(client.latest_timestamp(), 1_700_000_000);

    // Earlier rounds stay queryable.
    let first = client.get_round_data(&1).expect("round 1 recorded");
    assert_eq!(first.answer, INITIAL_ANSWER);
}

#[test]
fn test_update_round_data_overrides_latest() {
    let (_env, client) = setup();

    client.update_round_data(&7, &123_000_000i128, &500, &400);

    assert_eq!(client.latest_round(), 7);
    assert_eq!(
        client.latest_round_data(),
        RoundData {
            round_id: 7,
            answer: 123_000_000,
            started_at: 400,
            updated_at: 500,
            answered_in_round: 7,
        }
    );
}

#[test]
fn test_unknown_round_is_none() {
    let (_env, client) = setup();
    assert_eq!(client.get_round_data(&42), None);
}

#[test]
fn test_version_and_description() {
    let (env, client) = setup();
    assert_eq!(client.version(), 0);
    assert_eq!(
        client.description(),
        soroban_sdk::String::from_str(&env, "mock native/USD price feed")
    );
}
