//! Fixtures for ledger and simulator tests.
//!
//! Identities are derived from fixed labels so every test sees the same
//! principals. Helpers panic on unexpected rejections: they set up state,
//! they do not test it.

use surety_core::{Call, StateMachine, Transaction};
use surety_ledger::{GenesisConfig, Ledger, LedgerConfig};
use surety_types::{Amount, FlightKey, OracleIndex, Principal};

/// Name given to the airline registered at genesis.
pub const GENESIS_AIRLINE_NAME: &str = "Genesis Test Airlines";

/// Number of airlines and passengers funded at genesis.
pub const FUNDED_ACCOUNTS: u64 = 10;

pub fn owner() -> Principal {
    Principal::from_label("owner")
}

pub fn app_layer() -> Principal {
    Principal::from_label("app-layer")
}

/// Airline `0` is the genesis airline.
pub fn airline(n: u64) -> Principal {
    Principal::from_label(&format!("airline-{n}"))
}

pub fn passenger(n: u64) -> Principal {
    Principal::from_label(&format!("passenger-{n}"))
}

pub fn oracle(n: u64) -> Principal {
    Principal::from_label(&format!("oracle-{n}"))
}

pub fn flight(airline: Principal, code: &str) -> FlightKey {
    FlightKey::new(airline, code, 1_700_000_000)
}

/// Genesis with the owner, airlines and passengers funded.
pub fn genesis() -> GenesisConfig {
    let mut genesis = GenesisConfig::new(owner(), app_layer(), airline(0), GENESIS_AIRLINE_NAME)
        .with_balance(owner(), Amount::ether(10));
    for n in 0..FUNDED_ACCOUNTS {
        genesis = genesis
            .with_balance(airline(n), Amount::ether(100))
            .with_balance(passenger(n), Amount::ether(10));
    }
    genesis
}

/// A ledger whose application layer is already authorized.
pub fn authorized_ledger(config: LedgerConfig) -> Ledger {
    let mut ledger = Ledger::new(config, genesis()).expect("genesis balances fit");
    ledger
        .apply(Transaction::new(
            owner(),
            Call::AuthorizeCaller { layer: app_layer() },
        ))
        .expect("owner authorizes app layer");
    ledger
}

/// Pay `airline`'s participation fee exactly.
pub fn pay_fee(ledger: &mut Ledger, airline: Principal) {
    let fee = ledger.config().governance.airline_fee;
    ledger
        .apply(Transaction::with_value(airline, fee, Call::PayAirlineFee))
        .expect("airline pays fee");
}

/// Make airlines `0..count` participating, voting as needed once the
/// pre-consensus threshold is passed.
pub fn participating_airlines(ledger: &mut Ledger, count: u64) -> Vec<Principal> {
    pay_fee(ledger, airline(0));
    let mut participating = vec![airline(0)];

    for n in 1..count {
        let candidate = airline(n);
        for voter in participating.clone() {
            ledger
                .apply(Transaction::new(
                    voter,
                    Call::RegisterAirline {
                        candidate,
                        name: format!("Airline {n}"),
                    },
                ))
                .expect("participating airline votes");
            if ledger.is_registered_airline(&candidate) {
                break;
            }
        }
        assert!(
            ledger.is_registered_airline(&candidate),
            "airline {n} did not reach quorum"
        );
        pay_fee(ledger, candidate);
        participating.push(candidate);
    }
    participating
}

/// Fund and register oracles `0..count`, returning their indices.
pub fn register_oracles(ledger: &mut Ledger, count: u64) -> Vec<(Principal, [OracleIndex; 3])> {
    let fee = ledger.config().oracles.oracle_fee;
    (0..count)
        .map(|n| {
            let id = oracle(n);
            ledger.fund_wallet(id, fee).expect("fund oracle");
            ledger
                .apply(Transaction::with_value(id, fee, Call::RegisterOracle))
                .expect("oracle registers");
            let indexes = ledger.my_indexes(&id).expect("registered oracle has indexes");
            (id, indexes)
        })
        .collect()
}

/// Distinct oracles from `registered` holding `index`.
pub fn oracles_on(registered: &[(Principal, [OracleIndex; 3])], index: OracleIndex) -> Vec<Principal> {
    registered
        .iter()
        .filter(|(_, indexes)| indexes.contains(&index))
        .map(|(id, _)| *id)
        .collect()
}
