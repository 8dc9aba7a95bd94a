//! Ledger configuration and genesis state.

use serde::{Deserialize, Serialize};
use surety_escrow::EscrowConfig;
use surety_governance::GovernanceConfig;
use surety_oracles::OracleConfig;
use surety_types::{Amount, Principal};

/// How strictly a status fetch validates the flight it names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightValidation {
    /// The flight must carry at least one policy.
    #[default]
    RequireInsured,
    /// Only the operating airline must be participating.
    AirlineOnly,
}

/// Configuration for the ledger and every component it composes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub flight_validation: FlightValidation,
    /// Flat cost charged to the caller of every successful mutation.
    pub gas_cost: Amount,
    pub governance: GovernanceConfig,
    pub oracles: OracleConfig,
    pub escrow: EscrowConfig,
}

impl LedgerConfig {
    pub fn with_governance(mut self, governance: GovernanceConfig) -> Self {
        self.governance = governance;
        self
    }

    pub fn with_oracles(mut self, oracles: OracleConfig) -> Self {
        self.oracles = oracles;
        self
    }

    pub fn with_escrow(mut self, escrow: EscrowConfig) -> Self {
        self.escrow = escrow;
        self
    }

    /// Set the number of matching oracle responses that finalize a status.
    pub fn with_min_responses(mut self, min_responses: u32) -> Self {
        self.oracles = self.oracles.with_min_responses(min_responses);
        self
    }

    pub fn with_flight_validation(mut self, validation: FlightValidation) -> Self {
        self.flight_validation = validation;
        self
    }

    pub fn with_gas_cost(mut self, gas_cost: Amount) -> Self {
        self.gas_cost = gas_cost;
        self
    }
}

/// State the ledger starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Deployer; the only caller allowed to administer the ledger.
    pub owner: Principal,
    /// Application layer that must be authorized before state can change.
    pub app_layer: Principal,
    /// Airline registered at deployment.
    pub genesis_airline: Principal,
    pub genesis_airline_name: String,
    /// Initial wallet balances.
    pub balances: Vec<(Principal, Amount)>,
}

impl GenesisConfig {
    pub fn new(
        owner: Principal,
        app_layer: Principal,
        genesis_airline: Principal,
        genesis_airline_name: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            app_layer,
            genesis_airline,
            genesis_airline_name: genesis_airline_name.into(),
            balances: Vec::new(),
        }
    }

    /// Add an initial wallet balance.
    pub fn with_balance(mut self, holder: Principal, amount: Amount) -> Self {
        self.balances.push((holder, amount));
        self
    }
}
