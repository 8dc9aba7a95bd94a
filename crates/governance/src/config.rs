//! Configuration for airline governance.

use serde::{Deserialize, Serialize};
use surety_types::Amount;

/// Configuration for admitting airlines into the federation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Registered airlines below this count are admitted without a vote.
    pub pre_consensus_airlines: usize,

    /// Percentage of registered airlines that must vote for a candidate.
    ///
    /// The required vote count rounds up.
    pub consensus_percent: u32,

    /// Participation fee a registered airline pays to start selling insurance.
    pub airline_fee: Amount,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            pre_consensus_airlines: 4,
            consensus_percent: 50,
            airline_fee: Amount::ether(10),
        }
    }
}

impl GovernanceConfig {
    /// Set the pre-consensus threshold.
    pub fn with_pre_consensus_airlines(mut self, count: usize) -> Self {
        self.pre_consensus_airlines = count;
        self
    }

    /// Set the consensus percentage, clamped to 100.
    pub fn with_consensus_percent(mut self, percent: u32) -> Self {
        self.consensus_percent = percent.min(100);
        self
    }

    /// Set the participation fee.
    pub fn with_airline_fee(mut self, fee: Amount) -> Self {
        self.airline_fee = fee;
        self
    }
}
