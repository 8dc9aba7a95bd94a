//! Policies, settlement and passenger credit.

use crate::EscrowConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use surety_core::LedgerError;
use surety_types::{Amount, FlightKey, LedgerEvent, Principal, StatusCode};
use tracing::{debug, info};

/// One passenger's cover on one flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub passenger: Principal,
    /// Premium paid.
    pub amount: Amount,
    /// Ledger time of purchase.
    pub purchased_at: Duration,
    /// Set once the flight's status has been applied to this policy.
    pub settled: bool,
}

/// Holds premiums and converts them into passenger credit on payout.
#[derive(Debug)]
pub struct InsuranceEscrow {
    config: EscrowConfig,
    /// flight -> passenger -> policy, in purchase order.
    policies: HashMap<FlightKey, IndexMap<Principal, Policy>>,
    credits: HashMap<Principal, Amount>,
}

impl InsuranceEscrow {
    pub fn new(config: EscrowConfig) -> Self {
        Self {
            config,
            policies: HashMap::new(),
            credits: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Purchase
    // ═══════════════════════════════════════════════════════════════════════

    /// Check that `passenger` may buy cover worth `amount` on `flight`.
    pub fn check_purchase(
        &self,
        flight: &FlightKey,
        passenger: &Principal,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if self.is_insured(passenger, flight) {
            return Err(LedgerError::AlreadyInsured);
        }
        if amount > self.config.max_premium {
            return Err(LedgerError::AmountExceedsCap {
                cap: self.config.max_premium,
                provided: amount,
            });
        }
        if amount.is_zero() {
            return Err(LedgerError::InsufficientFunds {
                required: Amount::from_units(1),
                provided: amount,
            });
        }
        Ok(())
    }

    /// Record a policy. The premium stays with the ledger.
    pub fn purchase(
        &mut self,
        flight: FlightKey,
        passenger: Principal,
        amount: Amount,
        now: Duration,
    ) -> Result<LedgerEvent, LedgerError> {
        self.check_purchase(&flight, &passenger, amount)?;

        self.policies.entry(flight.clone()).or_default().insert(
            passenger,
            Policy {
                passenger,
                amount,
                purchased_at: now,
                settled: false,
            },
        );

        info!(
            flight = %flight,
            passenger = %passenger.short(),
            amount = %amount,
            "Insurance purchased"
        );
        Ok(LedgerEvent::FlightInsurancePurchased {
            flight,
            passenger,
            amount,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Settlement
    // ═══════════════════════════════════════════════════════════════════════

    /// Credit balances each passenger on `flight` would hold after settling
    /// with `status`. Pure; fails only on overflow.
    pub fn settlement_for(
        &self,
        flight: &FlightKey,
        status: StatusCode,
    ) -> Result<Vec<(Principal, Amount)>, LedgerError> {
        let Some(policies) = self.policies.get(flight) else {
            return Ok(Vec::new());
        };
        if !status.is_payout() {
            return Ok(Vec::new());
        }

        policies
            .values()
            .filter(|p| !p.settled)
            .map(|policy| {
                let payout = self
                    .config
                    .payout_for(policy.amount)
                    .ok_or(LedgerError::AmountOverflow)?;
                let balance = self
                    .credit_of(&policy.passenger)
                    .checked_add(payout)
                    .ok_or(LedgerError::AmountOverflow)?;
                Ok((policy.passenger, balance))
            })
            .collect()
    }

    /// Apply a finalized status to every unsettled policy on `flight`.
    ///
    /// A payout status credits each passenger `amount × numerator /
    /// denominator`; any other status credits nothing. Each policy is
    /// settled at most once. Returns the total credited.
    pub fn settle(&mut self, flight: &FlightKey, status: StatusCode) -> Result<Amount, LedgerError> {
        let owed = self.settlement_for(flight, status)?;

        let mut total = Amount::ZERO;
        for (passenger, balance) in owed {
            let credited = balance.saturating_sub(self.credit_of(&passenger));
            total = total.checked_add(credited).ok_or(LedgerError::AmountOverflow)?;
            self.credits.insert(passenger, balance);
            debug!(passenger = %passenger.short(), credit = %balance, "Passenger credited");
        }
        if let Some(policies) = self.policies.get_mut(flight) {
            for policy in policies.values_mut() {
                policy.settled = true;
            }
        }

        info!(flight = %flight, status = ?status, credited = %total, "Flight settled");
        Ok(total)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Withdrawal
    // ═══════════════════════════════════════════════════════════════════════

    /// Check that `passenger` has credit to withdraw, returning it.
    pub fn check_withdraw(&self, passenger: &Principal) -> Result<Amount, LedgerError> {
        let credit = self.credit_of(passenger);
        if credit.is_zero() {
            return Err(LedgerError::NoCredit);
        }
        Ok(credit)
    }

    /// Zero `passenger`'s credit and return the amount to transfer.
    pub fn take_credit(&mut self, passenger: &Principal) -> Result<Amount, LedgerError> {
        let credit = self.check_withdraw(passenger)?;
        self.credits.remove(passenger);
        info!(passenger = %passenger.short(), amount = %credit, "Credit withdrawn");
        Ok(credit)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn is_insured(&self, passenger: &Principal, flight: &FlightKey) -> bool {
        self.policies
            .get(flight)
            .is_some_and(|policies| policies.contains_key(passenger))
    }

    /// Whether any policy has been sold on `flight`.
    pub fn has_policies(&self, flight: &FlightKey) -> bool {
        self.policies.get(flight).is_some_and(|p| !p.is_empty())
    }

    /// Policies on `flight` in purchase order.
    pub fn policies_for(&self, flight: &FlightKey) -> Vec<Policy> {
        self.policies
            .get(flight)
            .map(|p| p.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn credit_of(&self, passenger: &Principal) -> Amount {
        self.credits.get(passenger).copied().unwrap_or(Amount::ZERO)
    }

    /// Sum of all credit not yet withdrawn, `None` if it overflows.
    pub fn outstanding_credit(&self) -> Option<Amount> {
        self.credits
            .values()
            .try_fold(Amount::ZERO, |acc, c| acc.checked_add(*c))
    }
}
