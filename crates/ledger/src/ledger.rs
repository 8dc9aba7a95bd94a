//! The ledger state machine.

use crate::{
    ChainEntropy, EventLog, FlightValidation, GenesisConfig, InsuredFlight, LedgerConfig,
    OracleRequestView, Wallets,
};
use std::collections::BTreeSet;
use std::time::Duration;
use surety_core::{Call, EntropySource, LedgerError, Receipt, StateMachine, Transaction};
use surety_escrow::{InsuranceEscrow, Policy};
use surety_governance::{Airline, AirlineRegistry};
use surety_oracles::{OracleIndexRegistry, OracleRequestTracker, ResponseTracker, INDICES_PER_ORACLE};
use surety_types::{
    Amount, BlockHeight, EventKind, FlightKey, LedgerEvent, OracleIndex, Principal, StatusCode,
};
use tracing::{debug, info, instrument};

/// What a dispatched call produced, before value accounting.
struct Outcome {
    events: Vec<LedgerEvent>,
    refund: Amount,
    payout: Amount,
}

impl Outcome {
    fn events(events: Vec<LedgerEvent>) -> Self {
        Self {
            events,
            refund: Amount::ZERO,
            payout: Amount::ZERO,
        }
    }

    fn refund(mut self, refund: Amount) -> Self {
        self.refund = refund;
        self
    }
}

/// Flight surety ledger.
///
/// Composes airline governance, oracle consensus and the insurance escrow
/// behind one serialized [`StateMachine`]. Every transaction either applies
/// completely or leaves no trace, wallet balances included.
pub struct Ledger {
    config: LedgerConfig,
    owner: Principal,
    app_layer: Principal,
    authorized: BTreeSet<Principal>,
    operational: bool,

    airlines: AirlineRegistry,
    oracles: OracleIndexRegistry,
    requests: OracleRequestTracker,
    escrow: InsuranceEscrow,

    wallets: Wallets,
    /// Value held by the ledger itself: fees, premiums and unpaid credit.
    funds: Amount,

    events: EventLog,
    height: BlockHeight,
    now: Duration,
    entropy: Box<dyn EntropySource>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("owner", &self.owner)
            .field("operational", &self.operational)
            .field("height", &self.height)
            .field("funds", &self.funds)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Create a ledger from genesis with entropy chained from the genesis
    /// principals.
    pub fn new(config: LedgerConfig, genesis: GenesisConfig) -> Result<Self, LedgerError> {
        let seed = [
            genesis.owner.as_bytes().as_slice(),
            genesis.genesis_airline.as_bytes().as_slice(),
        ]
        .concat();
        Self::with_entropy(config, genesis, Box::new(ChainEntropy::new(&seed)))
    }

    /// Create a ledger drawing indices from `entropy`.
    pub fn with_entropy(
        config: LedgerConfig,
        genesis: GenesisConfig,
        entropy: Box<dyn EntropySource>,
    ) -> Result<Self, LedgerError> {
        let airlines = AirlineRegistry::with_genesis_airline(
            config.governance.clone(),
            genesis.genesis_airline,
            genesis.genesis_airline_name.clone(),
        );
        let mut wallets = Wallets::new();
        for (holder, amount) in &genesis.balances {
            wallets.credit(*holder, *amount)?;
        }
        let mut events = EventLog::new();
        events.append(
            BlockHeight::GENESIS,
            LedgerEvent::AirlineRegistered {
                airline: genesis.genesis_airline,
                name: genesis.genesis_airline_name.clone(),
            },
        );

        info!(
            owner = %genesis.owner.short(),
            airline = %genesis.genesis_airline.short(),
            "Ledger created"
        );

        Ok(Self {
            oracles: OracleIndexRegistry::new(config.oracles.oracle_fee),
            requests: OracleRequestTracker::new(config.oracles.min_responses),
            escrow: InsuranceEscrow::new(config.escrow.clone()),
            config,
            owner: genesis.owner,
            app_layer: genesis.app_layer,
            authorized: BTreeSet::new(),
            operational: true,
            airlines,
            wallets,
            funds: Amount::ZERO,
            events,
            height: BlockHeight::GENESIS,
            now: Duration::ZERO,
            entropy,
        })
    }

    /// Credit a wallet from outside the ledger, as a faucet would.
    pub fn fund_wallet(&mut self, holder: Principal, amount: Amount) -> Result<(), LedgerError> {
        self.wallets.credit(holder, amount)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Access control
    // ═══════════════════════════════════════════════════════════════════════

    fn check_access(&self, caller: &Principal, call: &Call) -> Result<(), LedgerError> {
        if call.is_owner_only() {
            if *caller != self.owner {
                return Err(LedgerError::Unauthorized("Caller is not the contract owner."));
            }
            return Ok(());
        }
        if !self.operational {
            return Err(LedgerError::NotOperational);
        }
        if !self.authorized.contains(&self.app_layer) {
            return Err(LedgerError::Unauthorized(
                "Application layer is not authorized.",
            ));
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════════

    fn dispatch(&mut self, caller: Principal, value: Amount, call: Call) -> Result<Outcome, LedgerError> {
        match call {
            Call::RegisterAirline { candidate, name } => {
                let events = self.airlines.register_airline(candidate, &name, caller)?;
                Ok(Outcome::events(events).refund(value))
            }
            Call::PayAirlineFee => {
                let refund = self.airlines.pay_airline_fee(caller, value)?;
                Ok(Outcome::events(vec![]).refund(refund))
            }
            Call::RegisterOracle => {
                self.oracles
                    .register_oracle(caller, value, self.entropy.as_mut())?;
                Ok(Outcome::events(vec![]))
            }
            Call::FetchFlightStatus { flight } => {
                let event = self.fetch_flight_status(caller, flight)?;
                Ok(Outcome::events(vec![event]).refund(value))
            }
            Call::SubmitOracleResponse {
                index,
                flight,
                status,
            } => {
                let events = self.submit_oracle_response(caller, index, flight, status)?;
                Ok(Outcome::events(events).refund(value))
            }
            Call::PurchaseInsurance { flight } => {
                if !self.airlines.is_participating_airline(&flight.airline) {
                    return Err(LedgerError::AirlineNotParticipating);
                }
                // A finalized flight is never settled again.
                self.requests.check_fetch(&flight)?;
                let event = self.escrow.purchase(flight, caller, value, self.now)?;
                Ok(Outcome::events(vec![event]))
            }
            Call::WithdrawCredit => {
                let credit = self.escrow.check_withdraw(&caller)?;
                let available = self
                    .funds
                    .checked_add(value)
                    .ok_or(LedgerError::AmountOverflow)?;
                if credit > available {
                    return Err(LedgerError::EscrowUnderfunded);
                }
                let payout = self.escrow.take_credit(&caller)?;
                Ok(Outcome {
                    events: vec![],
                    refund: value,
                    payout,
                })
            }
            Call::AuthorizeCaller { layer } => {
                self.authorized.insert(layer);
                info!(layer = %layer.short(), "Caller authorized");
                Ok(Outcome::events(vec![]).refund(value))
            }
            Call::DeauthorizeCaller { layer } => {
                self.authorized.remove(&layer);
                info!(layer = %layer.short(), "Caller deauthorized");
                Ok(Outcome::events(vec![]).refund(value))
            }
            Call::SetOperational { operational } => {
                self.operational = operational;
                info!(operational, "Operational status changed");
                Ok(Outcome::events(vec![]).refund(value))
            }
        }
    }

    fn fetch_flight_status(
        &mut self,
        caller: Principal,
        flight: FlightKey,
    ) -> Result<LedgerEvent, LedgerError> {
        if !self.airlines.is_participating_airline(&flight.airline) {
            return Err(LedgerError::AirlineNotParticipating);
        }
        if self.config.flight_validation == FlightValidation::RequireInsured
            && !self.escrow.has_policies(&flight)
        {
            return Err(LedgerError::UnknownFlight);
        }
        self.requests.open(flight, caller, self.entropy.as_mut())
    }

    fn submit_oracle_response(
        &mut self,
        caller: Principal,
        index: OracleIndex,
        flight: FlightKey,
        status: StatusCode,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.requests
            .check_response(index, &flight, &caller, &self.oracles)?;
        if self.requests.would_finalize(index, &flight, status) {
            self.escrow.settlement_for(&flight, status)?;
        }

        let finalized = self
            .requests
            .submit_response(index, &flight, status, caller, &self.oracles)?;
        let Some(status) = finalized else {
            return Ok(vec![]);
        };
        self.escrow.settle(&flight, status)?;
        Ok(vec![LedgerEvent::FlightStatusInfo { flight, status }])
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Value accounting
    // ═══════════════════════════════════════════════════════════════════════

    fn settle_value(
        &mut self,
        caller: Principal,
        value: Amount,
        outcome: &Outcome,
    ) -> Result<(), LedgerError> {
        let gas = self.config.gas_cost;
        self.funds = self
            .funds
            .checked_add(value)
            .and_then(|f| f.checked_sub(outcome.refund))
            .and_then(|f| f.checked_sub(outcome.payout))
            .ok_or(LedgerError::EscrowUnderfunded)?;
        let returned = outcome
            .refund
            .checked_add(outcome.payout)
            .ok_or(LedgerError::AmountOverflow)?;
        self.wallets.credit(caller, returned)?;
        self.wallets.debit(caller, gas)
    }

    fn seal_block(&mut self, caller: &Principal, call_name: &str, events: &[LedgerEvent]) {
        self.height = self.height.next();
        for event in events {
            self.events.append(self.height, event.clone());
        }
        let block = [
            self.height.0.to_le_bytes().as_slice(),
            caller.as_bytes().as_slice(),
            call_name.as_bytes(),
        ]
        .concat();
        self.entropy.advance(&block);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn owner(&self) -> Principal {
        self.owner
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn is_authorized(&self, layer: &Principal) -> bool {
        self.authorized.contains(layer)
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Value held by the ledger.
    pub fn funds(&self) -> Amount {
        self.funds
    }

    pub fn balance_of(&self, holder: &Principal) -> Amount {
        self.wallets.balance_of(holder)
    }

    // Airlines

    pub fn airline(&self, id: &Principal) -> Option<&Airline> {
        self.airlines.airline(id)
    }

    pub fn is_registered_airline(&self, id: &Principal) -> bool {
        self.airlines.is_registered_airline(id)
    }

    pub fn is_participating_airline(&self, id: &Principal) -> bool {
        self.airlines.is_participating_airline(id)
    }

    pub fn is_candidate_airline(&self, id: &Principal) -> bool {
        self.airlines.is_candidate_airline(id)
    }

    pub fn candidate_votes(&self, candidate: &Principal) -> usize {
        self.airlines.candidate_votes(candidate)
    }

    pub fn is_voter_of(&self, candidate: &Principal, voter: &Principal) -> bool {
        self.airlines.is_voter_of(candidate, voter)
    }

    pub fn registered_airline_name(&self, id: &Principal) -> Option<&str> {
        self.airlines.registered_airline_name(id)
    }

    pub fn registered_airline_count(&self) -> usize {
        self.airlines.registered_airline_count()
    }

    // Oracles

    pub fn my_indexes(
        &self,
        oracle: &Principal,
    ) -> Result<[OracleIndex; INDICES_PER_ORACLE], LedgerError> {
        self.oracles.indexes_of(oracle)
    }

    pub fn is_oracle_registered(&self, oracle: &Principal) -> bool {
        self.oracles.is_registered(oracle)
    }

    pub fn is_oracle_request_open_for_index(&self, flight: &FlightKey, index: OracleIndex) -> bool {
        self.requests.is_open_for_index(flight, index)
    }

    pub fn flight_status(&self, flight: &FlightKey) -> StatusCode {
        self.requests.flight_status(flight)
    }

    /// Most recent request opened for `flight`.
    pub fn oracle_request(&self, flight: &FlightKey) -> Option<&ResponseTracker> {
        self.requests.request(flight)
    }

    /// Every request ever opened, in the order they were opened.
    pub fn oracle_requests(&self) -> Vec<OracleRequestView> {
        self.events
            .of_kind(EventKind::OracleRequest)
            .filter_map(|logged| match &logged.event {
                LedgerEvent::OracleRequest { index, flight } => Some(OracleRequestView {
                    sequence: logged.sequence,
                    flight: flight.clone(),
                    index: *index,
                    open: self.requests.is_open_for_index(flight, *index),
                    status: self.requests.flight_status(flight),
                }),
                _ => None,
            })
            .collect()
    }

    // Escrow

    pub fn is_insured(&self, passenger: &Principal, flight: &FlightKey) -> bool {
        self.escrow.is_insured(passenger, flight)
    }

    pub fn passenger_credit(&self, passenger: &Principal) -> Amount {
        self.escrow.credit_of(passenger)
    }

    pub fn policies_for(&self, flight: &FlightKey) -> Vec<Policy> {
        self.escrow.policies_for(flight)
    }

    /// Every policy ever sold, in purchase order, with its flight's status.
    pub fn insured_flights(&self) -> Vec<InsuredFlight> {
        self.events
            .of_kind(EventKind::FlightInsurancePurchased)
            .filter_map(|logged| match &logged.event {
                LedgerEvent::FlightInsurancePurchased {
                    flight,
                    passenger,
                    amount,
                } => Some(InsuredFlight {
                    sequence: logged.sequence,
                    flight: flight.clone(),
                    passenger: *passenger,
                    amount: *amount,
                    status: self.requests.flight_status(flight),
                }),
                _ => None,
            })
            .collect()
    }
}

impl StateMachine for Ledger {
    #[instrument(skip(self, tx), fields(caller = %tx.caller.short(), call = tx.call.type_name()))]
    fn apply(&mut self, tx: Transaction) -> Result<Receipt, LedgerError> {
        let Transaction {
            caller,
            value,
            call,
        } = tx;
        let call_name = call.type_name();

        self.check_access(&caller, &call)?;

        let gas = self.config.gas_cost;
        let cost = value.checked_add(gas).ok_or(LedgerError::AmountOverflow)?;
        if self.wallets.balance_of(&caller) < cost {
            return Err(LedgerError::InsufficientBalance);
        }
        self.wallets.debit(caller, value)?;

        let outcome = match self.dispatch(caller, value, call) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.wallets.credit(caller, value)?;
                debug!(error = %err, "Transaction rejected");
                return Err(err);
            }
        };

        self.settle_value(caller, value, &outcome)?;
        self.seal_block(&caller, call_name, &outcome.events);

        debug!(
            height = self.height.0,
            events = outcome.events.len(),
            "Transaction applied"
        );
        Ok(Receipt {
            events: outcome.events,
            refund: outcome.refund,
            payout: outcome.payout,
            gas_cost: gas,
        })
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    fn now(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_governance::AirlineState;
    use tracing_test::traced_test;

    fn owner() -> Principal {
        Principal::from_label("owner")
    }

    fn app() -> Principal {
        Principal::from_label("app")
    }

    fn first_airline() -> Principal {
        Principal::from_label("first-airline")
    }

    fn passenger() -> Principal {
        Principal::from_label("passenger")
    }

    fn ledger_with(config: LedgerConfig) -> Ledger {
        let genesis = GenesisConfig::new(owner(), app(), first_airline(), "Genesis Test Airlines")
            .with_balance(owner(), Amount::ether(1))
            .with_balance(first_airline(), Amount::ether(100))
            .with_balance(passenger(), Amount::ether(10));
        let mut ledger = Ledger::new(config, genesis).unwrap();
        ledger
            .apply(Transaction::new(owner(), Call::AuthorizeCaller { layer: app() }))
            .unwrap();
        ledger
    }

    fn ledger() -> Ledger {
        ledger_with(LedgerConfig::default())
    }

    fn pay_fee(ledger: &mut Ledger, airline: Principal) {
        ledger
            .apply(Transaction::with_value(airline, Amount::ether(10), Call::PayAirlineFee))
            .unwrap();
    }

    #[traced_test]
    #[test]
    fn test_genesis_airline_registered_not_participating() {
        let ledger = ledger();

        assert!(ledger.is_registered_airline(&first_airline()));
        assert!(!ledger.is_participating_airline(&first_airline()));
        assert_eq!(ledger.registered_airline_count(), 1);
        assert_eq!(
            ledger.registered_airline_name(&first_airline()),
            Some("Genesis Test Airlines")
        );
        assert_eq!(ledger.events().len(), 1);
    }

    #[traced_test]
    #[test]
    fn test_unauthorized_until_app_layer_authorized() {
        let genesis = GenesisConfig::new(owner(), app(), first_airline(), "Genesis")
            .with_balance(first_airline(), Amount::ether(100));
        let mut ledger = Ledger::new(LedgerConfig::default(), genesis).unwrap();

        let pay = Transaction::with_value(first_airline(), Amount::ether(10), Call::PayAirlineFee);
        assert!(matches!(ledger.apply(pay.clone()), Err(LedgerError::Unauthorized(_))));
        assert_eq!(ledger.balance_of(&first_airline()), Amount::ether(100));

        ledger
            .apply(Transaction::new(owner(), Call::AuthorizeCaller { layer: app() }))
            .unwrap();
        ledger.apply(pay).unwrap();
        assert!(ledger.is_participating_airline(&first_airline()));
    }

    #[traced_test]
    #[test]
    fn test_owner_only_calls_reject_others() {
        let mut ledger = ledger();

        let result = ledger.apply(Transaction::new(
            first_airline(),
            Call::SetOperational { operational: false },
        ));
        assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
        assert!(ledger.is_operational());
    }

    #[traced_test]
    #[test]
    fn test_paused_ledger_rejects_mutations() {
        let mut ledger = ledger();
        ledger
            .apply(Transaction::new(owner(), Call::SetOperational { operational: false }))
            .unwrap();

        let pay = Transaction::with_value(first_airline(), Amount::ether(10), Call::PayAirlineFee);
        assert_eq!(ledger.apply(pay.clone()), Err(LedgerError::NotOperational));

        ledger
            .apply(Transaction::new(owner(), Call::SetOperational { operational: true }))
            .unwrap();
        ledger.apply(pay).unwrap();
    }

    #[traced_test]
    #[test]
    fn test_fee_padding_is_refunded() {
        let mut ledger = ledger_with(LedgerConfig::default().with_gas_cost(Amount::milli_ether(2)));
        let before = ledger.balance_of(&first_airline());

        let receipt = ledger
            .apply(Transaction::with_value(
                first_airline(),
                Amount::ether(15),
                Call::PayAirlineFee,
            ))
            .unwrap();

        assert_eq!(receipt.refund, Amount::ether(5));
        assert_eq!(
            ledger.balance_of(&first_airline()),
            before
                .checked_sub(Amount::ether(10))
                .and_then(|b| b.checked_sub(Amount::milli_ether(2)))
                .unwrap()
        );
        assert_eq!(ledger.funds(), Amount::ether(10));
    }

    #[traced_test]
    #[test]
    fn test_rejected_call_restores_wallet() {
        let mut ledger = ledger_with(LedgerConfig::default().with_gas_cost(Amount::milli_ether(2)));
        let before = ledger.balance_of(&first_airline());
        let height = ledger.height();

        let result = ledger.apply(Transaction::with_value(
            first_airline(),
            Amount::ether(9),
            Call::PayAirlineFee,
        ));

        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(ledger.balance_of(&first_airline()), before);
        assert_eq!(ledger.height(), height);
        assert_eq!(ledger.funds(), Amount::ZERO);
    }

    #[traced_test]
    #[test]
    fn test_wallet_must_cover_value() {
        let mut ledger = ledger();
        let broke = Principal::from_label("broke");

        assert_eq!(
            ledger.apply(Transaction::with_value(broke, Amount::ether(1), Call::RegisterOracle)),
            Err(LedgerError::InsufficientBalance)
        );
        assert!(!ledger.is_oracle_registered(&broke));
    }

    #[traced_test]
    #[test]
    fn test_purchase_requires_participating_airline() {
        let mut ledger = ledger();
        let flight = FlightKey::new(first_airline(), "123", 1_000);

        let buy = Transaction::with_value(
            passenger(),
            Amount::milli_ether(500),
            Call::PurchaseInsurance {
                flight: flight.clone(),
            },
        );
        assert_eq!(ledger.apply(buy.clone()), Err(LedgerError::AirlineNotParticipating));

        pay_fee(&mut ledger, first_airline());
        ledger.apply(buy.clone()).unwrap();
        assert!(ledger.is_insured(&passenger(), &flight));
        assert_eq!(ledger.apply(buy), Err(LedgerError::AlreadyInsured));
        assert!(ledger.is_insured(&passenger(), &flight));
        assert_eq!(ledger.insured_flights().len(), 1);
    }

    #[traced_test]
    #[test]
    fn test_fetch_validates_flight() {
        let mut ledger = ledger();
        pay_fee(&mut ledger, first_airline());
        let flight = FlightKey::new(first_airline(), "999", 1_000);
        let fetch = Transaction::new(
            passenger(),
            Call::FetchFlightStatus {
                flight: flight.clone(),
            },
        );

        assert_eq!(ledger.apply(fetch.clone()), Err(LedgerError::UnknownFlight));

        let mut lenient =
            ledger_with(LedgerConfig::default().with_flight_validation(FlightValidation::AirlineOnly));
        pay_fee(&mut lenient, first_airline());
        let receipt = lenient.apply(fetch).unwrap();
        assert!(matches!(
            receipt.events.as_slice(),
            [LedgerEvent::OracleRequest { .. }]
        ));
        assert_eq!(lenient.oracle_requests().len(), 1);
        assert!(lenient.oracle_requests()[0].open);
    }

    #[traced_test]
    #[test]
    fn test_airline_registration_through_ledger() {
        let mut ledger = ledger();
        pay_fee(&mut ledger, first_airline());
        let second = Principal::from_label("second");

        let receipt = ledger
            .apply(Transaction::new(
                first_airline(),
                Call::RegisterAirline {
                    candidate: second,
                    name: "Second Air".into(),
                },
            ))
            .unwrap();

        assert_eq!(
            receipt.events,
            vec![LedgerEvent::AirlineRegistered {
                airline: second,
                name: "Second Air".into()
            }]
        );
        assert_eq!(ledger.airline(&second).map(|a| a.state), Some(AirlineState::Registered));
        assert_eq!(ledger.events().len(), 2);
    }

    #[traced_test]
    #[test]
    fn test_withdraw_without_credit() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.apply(Transaction::new(passenger(), Call::WithdrawCredit)),
            Err(LedgerError::NoCredit)
        );
    }

    #[traced_test]
    #[test]
    fn test_oracle_registration_keeps_fee() {
        let mut ledger = ledger();
        let oracle = Principal::from_label("oracle");
        ledger.fund_wallet(oracle, Amount::ether(3)).unwrap();

        ledger
            .apply(Transaction::with_value(oracle, Amount::ether(2), Call::RegisterOracle))
            .unwrap();

        assert_eq!(ledger.balance_of(&oracle), Amount::ether(1));
        assert_eq!(ledger.funds(), Amount::ether(2));
        assert!(ledger.my_indexes(&oracle).is_ok());
        assert_eq!(
            ledger.my_indexes(&Principal::from_label("nobody")),
            Err(LedgerError::NotRegistered)
        );
    }
}
