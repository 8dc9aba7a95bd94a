//! End-to-end scenario: airlines join, passengers buy cover, oracles settle.

use crate::{DispatchReport, OracleSimulator, SimulatorConfig, SimulatorError};
use surety_core::{Call, Transaction};
use surety_ledger::{GenesisConfig, Ledger, SharedLedger};
use surety_types::{Amount, FlightKey, Principal, StatusCode};
use std::time::Duration;
use tracing::info;

/// Sales open this long before departure.
const BOOKING_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Gap between consecutive policy sales.
const SALE_INTERVAL: Duration = Duration::from_secs(60);

/// Identities used by the scenario runner.
pub mod identities {
    use surety_types::Principal;

    pub fn owner() -> Principal {
        Principal::from_label("owner")
    }

    pub fn app_layer() -> Principal {
        Principal::from_label("app-layer")
    }

    /// Airline `0` is registered at genesis.
    pub fn airline(n: u64) -> Principal {
        Principal::from_label(&format!("airline-{n}"))
    }

    pub fn passenger(n: u64) -> Principal {
        Principal::from_label(&format!("passenger-{n}"))
    }
}

/// Final state of one insured flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightOutcome {
    pub flight: FlightKey,
    pub status: StatusCode,
    pub policies: usize,
    /// Ledger time of the most recent sale on the flight.
    pub last_sold_at: Option<Duration>,
}

/// What a scenario run produced.
#[derive(Clone, Debug)]
pub struct SettlementReport {
    pub airlines: usize,
    pub flights: Vec<FlightOutcome>,
    /// Credit each passenger withdrew.
    pub withdrawals: Vec<(Principal, Amount)>,
    pub dispatches: Vec<DispatchReport>,
    /// Value left with the ledger at the end.
    pub ledger_funds: Amount,
}

impl SettlementReport {
    /// Flights that still have no finalized status.
    pub fn unresolved(&self) -> usize {
        self.flights
            .iter()
            .filter(|f| f.status == StatusCode::Unknown)
            .count()
    }

    /// Sum of all withdrawals, `None` if it overflows.
    pub fn total_withdrawn(&self) -> Option<Amount> {
        self.withdrawals
            .iter()
            .try_fold(Amount::ZERO, |acc, (_, a)| acc.checked_add(*a))
    }

    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        println!("=== Settlement Report ===");
        println!("Participating airlines: {}", self.airlines);
        println!("Flights:");
        for outcome in &self.flights {
            println!(
                "  {:<40} {:?} ({} policies)",
                outcome.flight.to_string(),
                outcome.status,
                outcome.policies
            );
        }
        println!("Oracle dispatches:");
        for d in &self.dispatches {
            println!(
                "  {} index {}: {} accepted, {} rejected, finalized {:?}, p50 {}us",
                d.flight, d.index, d.accepted, d.rejected(), d.finalized, d.p50_latency_micros
            );
        }
        println!("Withdrawals:");
        for (passenger, amount) in &self.withdrawals {
            println!("  {} withdrew {} ether", passenger.short(), amount);
        }
        match self.total_withdrawn() {
            Some(total) => println!("Total withdrawn: {} ether", total),
            None => println!("Total withdrawn: overflow"),
        }
        println!("Ledger funds:    {} ether", self.ledger_funds);
        println!("Unresolved flights: {}", self.unresolved());
    }
}

/// Build the genesis ledger described by `config`.
pub fn genesis_ledger(config: &SimulatorConfig) -> Result<SharedLedger, SimulatorError> {
    use identities::*;

    let scenario = &config.scenario;
    let mut genesis = GenesisConfig::new(owner(), app_layer(), airline(0), "Genesis Airlines")
        .with_balance(owner(), Amount::ether(1));
    for n in 0..scenario.airlines {
        genesis = genesis.with_balance(airline(n), scenario.initial_balance);
    }
    for n in 0..scenario.passengers {
        genesis = genesis.with_balance(passenger(n), scenario.initial_balance);
    }

    let ledger = SharedLedger::new(Ledger::new(config.ledger.clone(), genesis)?);
    ledger.submit(Transaction::new(
        owner(),
        Call::AuthorizeCaller { layer: app_layer() },
    ))?;
    Ok(ledger)
}

/// Admit and fund airlines `0..count`, voting once past the threshold.
fn onboard_airlines(ledger: &SharedLedger, count: u64, fee: Amount) -> Result<Vec<Principal>, SimulatorError> {
    use identities::airline;

    ledger.submit(Transaction::with_value(airline(0), fee, Call::PayAirlineFee))?;
    let mut participating = vec![airline(0)];

    for n in 1..count {
        let candidate = airline(n);
        for voter in &participating {
            ledger.submit(Transaction::new(
                *voter,
                Call::RegisterAirline {
                    candidate,
                    name: format!("Airline {n}"),
                },
            ))?;
            if ledger.read(|l| l.is_registered_airline(&candidate)) {
                break;
            }
        }
        ledger.submit(Transaction::with_value(candidate, fee, Call::PayAirlineFee))?;
        participating.push(candidate);
    }

    info!(airlines = participating.len(), "Airlines participating");
    Ok(participating)
}

/// Run the whole scenario and report how every flight settled.
pub async fn run_scenario(config: SimulatorConfig) -> Result<SettlementReport, SimulatorError> {
    use identities::passenger;

    config.validate()?;
    let scenario = config.scenario.clone();
    let ledger = genesis_ledger(&config)?;

    let fee = config.ledger.governance.airline_fee;
    let airlines = onboard_airlines(&ledger, scenario.airlines, fee)?;

    let flights: Vec<FlightKey> = airlines
        .iter()
        .flat_map(|airline| {
            scenario
                .flights
                .iter()
                .map(|code| FlightKey::new(*airline, code.clone(), scenario.departure))
        })
        .collect();

    // Passenger n insures flight n mod flights, one sale per interval
    // from the opening of the booking window.
    let departure = Duration::from_secs(scenario.departure);
    let mut now = departure.saturating_sub(BOOKING_WINDOW);
    let mut insured: Vec<FlightKey> = Vec::new();
    if !flights.is_empty() {
        for n in 0..scenario.passengers {
            let flight = flights[(n as usize) % flights.len()].clone();
            ledger.submit_at(
                now,
                Transaction::with_value(
                    passenger(n),
                    scenario.premium,
                    Call::PurchaseInsurance {
                        flight: flight.clone(),
                    },
                ),
            )?;
            now += SALE_INTERVAL;
            if !insured.contains(&flight) {
                insured.push(flight);
            }
        }
    }
    info!(policies = scenario.passengers, flights = insured.len(), "Policies sold");

    for (n, flight) in insured.iter().enumerate() {
        let requester = passenger(n as u64 % scenario.passengers.max(1));
        ledger.submit_at(
            departure,
            Transaction::new(
                requester,
                Call::FetchFlightStatus {
                    flight: flight.clone(),
                },
            ),
        )?;
    }

    let mut simulator = OracleSimulator::start(ledger.clone(), &config)?;
    let dispatches = simulator.process_pending().await?;

    let mut withdrawals = Vec::new();
    for n in 0..scenario.passengers {
        let p = passenger(n);
        if ledger.read(|l| l.passenger_credit(&p)).is_zero() {
            continue;
        }
        let receipt = ledger.submit(Transaction::new(p, Call::WithdrawCredit))?;
        withdrawals.push((p, receipt.payout));
    }

    let (flights, ledger_funds) = ledger.read(|l| {
        let outcomes = insured
            .iter()
            .map(|flight| FlightOutcome {
                flight: flight.clone(),
                status: l.flight_status(flight),
                policies: l.policies_for(flight).len(),
                last_sold_at: l.policies_for(flight).iter().map(|p| p.purchased_at).max(),
            })
            .collect();
        (outcomes, l.funds())
    });

    Ok(SettlementReport {
        airlines: airlines.len(),
        flights,
        withdrawals,
        dispatches,
        ledger_funds,
    })
}
