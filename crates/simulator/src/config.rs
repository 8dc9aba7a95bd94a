//! Configuration types for the simulator.

use crate::SimulatorError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use surety_ledger::LedgerConfig;
use surety_types::Amount;

/// Smallest accepted probability of drawing the payout code.
pub const MIN_PAYOUT_BIAS: f64 = 0.4;

/// Configuration for a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Number of oracle identities the simulator controls.
    pub oracle_count: u64,

    /// Oracles every index must have before any request is served.
    pub min_oracles_per_index: u32,

    /// Probability that a drawn status is the payout code.
    pub payout_bias: f64,

    /// Balance given to each oracle before it registers.
    pub oracle_funding: Amount,

    /// Random seed for reproducible response plans.
    pub seed: u64,

    /// Ledger the scenario runs against.
    pub ledger: LedgerConfig,

    /// What the scenario runner sets up before the oracles respond.
    pub scenario: ScenarioConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let ledger = LedgerConfig::default();
        Self {
            oracle_count: 30,
            min_oracles_per_index: ledger.oracles.min_responses,
            payout_bias: 0.6,
            oracle_funding: Amount::ether(2),
            seed: 12345,
            ledger,
            scenario: ScenarioConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, SimulatorError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, SimulatorError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, SimulatorError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the simulator cannot run with.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        if !(MIN_PAYOUT_BIAS..=1.0).contains(&self.payout_bias) {
            return Err(SimulatorError::InvalidConfig(format!(
                "payout_bias {} must be within {MIN_PAYOUT_BIAS}..=1.0",
                self.payout_bias
            )));
        }
        if self.oracle_count == 0 {
            return Err(SimulatorError::InvalidConfig(
                "oracle_count must be positive".to_string(),
            ));
        }
        if self.min_oracles_per_index == 0 {
            return Err(SimulatorError::InvalidConfig(
                "min_oracles_per_index must be positive".to_string(),
            ));
        }
        if self.oracle_funding < self.ledger.oracles.oracle_fee {
            return Err(SimulatorError::InvalidConfig(format!(
                "oracle_funding {} does not cover the oracle fee {}",
                self.oracle_funding, self.ledger.oracles.oracle_fee
            )));
        }
        self.scenario.validate(&self.ledger)
    }

    /// Set the number of oracles.
    pub fn with_oracle_count(mut self, count: u64) -> Self {
        self.oracle_count = count;
        self
    }

    /// Set the per-index coverage requirement.
    pub fn with_min_oracles_per_index(mut self, min: u32) -> Self {
        self.min_oracles_per_index = min;
        self
    }

    /// Set the payout bias.
    pub fn with_payout_bias(mut self, bias: f64) -> Self {
        self.payout_bias = bias;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the ledger configuration.
    pub fn with_ledger(mut self, ledger: LedgerConfig) -> Self {
        self.ledger = ledger;
        self
    }

    /// Set the scenario.
    pub fn with_scenario(mut self, scenario: ScenarioConfig) -> Self {
        self.scenario = scenario;
        self
    }
}

/// Airlines, passengers and flights the scenario runner creates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Participating airlines, genesis airline included.
    pub airlines: u64,

    /// Passengers buying cover.
    pub passengers: u64,

    /// Flight codes. Each airline operates every code.
    pub flights: Vec<String>,

    /// Scheduled departure shared by every flight, unix seconds.
    pub departure: u64,

    /// Premium each passenger pays per policy.
    pub premium: Amount,

    /// Starting balance of every airline and passenger.
    pub initial_balance: Amount,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            airlines: 5,
            passengers: 6,
            flights: vec!["ND1309".to_string(), "UA123".to_string(), "BA77".to_string()],
            departure: 1_700_000_000,
            premium: Amount::milli_ether(500),
            initial_balance: Amount::ether(100),
        }
    }
}

impl ScenarioConfig {
    fn validate(&self, ledger: &LedgerConfig) -> Result<(), SimulatorError> {
        if self.airlines == 0 {
            return Err(SimulatorError::InvalidConfig(
                "scenario needs at least the genesis airline".to_string(),
            ));
        }
        if self.premium.is_zero() || self.premium > ledger.escrow.max_premium {
            return Err(SimulatorError::InvalidConfig(format!(
                "premium {} must be positive and at most {}",
                self.premium, ledger.escrow.max_premium
            )));
        }
        Ok(())
    }

    /// Set the number of airlines.
    pub fn with_airlines(mut self, airlines: u64) -> Self {
        self.airlines = airlines;
        self
    }

    /// Set the number of passengers.
    pub fn with_passengers(mut self, passengers: u64) -> Self {
        self.passengers = passengers;
        self
    }

    /// Set the flight codes.
    pub fn with_flights(mut self, flights: Vec<String>) -> Self {
        self.flights = flights;
        self
    }

    /// Set the premium per policy.
    pub fn with_premium(mut self, premium: Amount) -> Self {
        self.premium = premium;
        self
    }
}
