//! Airline admission through the ledger.

use surety_core::{Call, LedgerError, StateMachine, Transaction};
use surety_ledger::LedgerConfig;
use surety_test_helpers::{airline, authorized_ledger, participating_airlines, pay_fee};
use surety_types::{Amount, LedgerEvent};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_fifth_airline_needs_two_votes() {
    let mut ledger = authorized_ledger(LedgerConfig::default());
    let voters = participating_airlines(&mut ledger, 4);
    assert_eq!(ledger.registered_airline_count(), 4);

    let candidate = airline(5);
    let nominate = |voter| {
        Transaction::new(
            voter,
            Call::RegisterAirline {
                candidate,
                name: "Fifth Air".into(),
            },
        )
    };

    let receipt = ledger.apply(nominate(voters[0])).unwrap();
    assert!(receipt.events.is_empty());
    assert!(ledger.is_candidate_airline(&candidate));
    assert_eq!(ledger.candidate_votes(&candidate), 1);

    assert_eq!(ledger.apply(nominate(voters[0])), Err(LedgerError::DuplicateVote));
    assert_eq!(ledger.candidate_votes(&candidate), 1);

    let receipt = ledger.apply(nominate(voters[1])).unwrap();
    assert_eq!(
        receipt.events,
        vec![LedgerEvent::AirlineRegistered {
            airline: candidate,
            name: "Fifth Air".into(),
        }]
    );
    assert!(ledger.is_registered_airline(&candidate));
    assert_eq!(ledger.registered_airline_count(), 5);
    assert_eq!(ledger.registered_airline_name(&candidate), Some("Fifth Air"));
}

#[traced_test]
#[test]
fn test_registered_airline_cannot_vote_before_paying() {
    let mut ledger = authorized_ledger(LedgerConfig::default());
    participating_airlines(&mut ledger, 1);

    ledger
        .apply(Transaction::new(
            airline(0),
            Call::RegisterAirline {
                candidate: airline(1),
                name: "One".into(),
            },
        ))
        .unwrap();
    let result = ledger.apply(Transaction::new(
        airline(1),
        Call::RegisterAirline {
            candidate: airline(2),
            name: "Two".into(),
        },
    ));
    assert!(matches!(result, Err(LedgerError::Unauthorized(_))));

    pay_fee(&mut ledger, airline(1));
    assert_eq!(
        ledger.apply(Transaction::with_value(
            airline(1),
            Amount::ether(10),
            Call::PayAirlineFee
        )),
        Err(LedgerError::AlreadyParticipating)
    );
}

#[traced_test]
#[test]
fn test_fee_padding_balance_delta_includes_gas() {
    let gas = Amount::milli_ether(21);
    let mut ledger = authorized_ledger(LedgerConfig::default().with_gas_cost(gas));
    let before = ledger.balance_of(&airline(0));

    let receipt = ledger
        .apply(Transaction::with_value(
            airline(0),
            Amount::ether(12),
            Call::PayAirlineFee,
        ))
        .unwrap();

    assert_eq!(receipt.refund, Amount::ether(2));
    assert_eq!(receipt.gas_cost, gas);
    let expected = before
        .checked_sub(Amount::ether(10))
        .and_then(|b| b.checked_sub(gas))
        .unwrap();
    assert_eq!(ledger.balance_of(&airline(0)), expected);
}

#[traced_test]
#[test]
fn test_deauthorized_app_layer_blocks_mutations() {
    let mut ledger = authorized_ledger(LedgerConfig::default());
    let app = surety_test_helpers::app_layer();
    ledger
        .apply(Transaction::new(
            surety_test_helpers::owner(),
            Call::DeauthorizeCaller { layer: app },
        ))
        .unwrap();

    let result = ledger.apply(Transaction::with_value(
        airline(0),
        Amount::ether(10),
        Call::PayAirlineFee,
    ));
    assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
    assert!(!ledger.is_authorized(&app));
}
