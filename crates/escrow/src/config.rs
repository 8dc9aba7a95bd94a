//! Configuration for policy sales and settlement.

use serde::{Deserialize, Serialize};
use surety_types::Amount;

/// Premium ceiling and payout multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    /// Largest premium a single policy may carry.
    pub max_premium: Amount,

    /// Payout multiplier numerator.
    pub payout_numerator: u64,

    /// Payout multiplier denominator.
    pub payout_denominator: u64,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            max_premium: Amount::ether(1),
            payout_numerator: 3,
            payout_denominator: 2,
        }
    }
}

impl EscrowConfig {
    /// Set the premium ceiling.
    pub fn with_max_premium(mut self, cap: Amount) -> Self {
        self.max_premium = cap;
        self
    }

    /// Set the payout multiplier. A zero denominator is treated as one.
    pub fn with_payout_ratio(mut self, numerator: u64, denominator: u64) -> Self {
        self.payout_numerator = numerator;
        self.payout_denominator = denominator.max(1);
        self
    }

    /// Credit owed for a premium of `amount`.
    pub fn payout_for(&self, amount: Amount) -> Option<Amount> {
        amount.checked_mul_ratio(
            u128::from(self.payout_numerator),
            u128::from(self.payout_denominator.max(1)),
        )
    }
}
