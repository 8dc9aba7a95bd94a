//! Configuration for the oracle protocol.

use serde::{Deserialize, Serialize};
use surety_types::Amount;

/// Configuration for oracle registration and response quorum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Stake an oracle pays to receive its indices.
    pub oracle_fee: Amount,

    /// Matching responses that close a request.
    pub min_responses: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            oracle_fee: Amount::ether(1),
            min_responses: 3,
        }
    }
}

impl OracleConfig {
    /// Set the registration fee.
    pub fn with_oracle_fee(mut self, fee: Amount) -> Self {
        self.oracle_fee = fee;
        self
    }

    /// Set the response quorum. Never below one.
    pub fn with_min_responses(mut self, min_responses: u32) -> Self {
        self.min_responses = min_responses.max(1);
        self
    }
}
