//! Native balances of every principal the ledger has seen.

use std::collections::HashMap;
use surety_core::LedgerError;
use surety_types::{Amount, Principal};

#[derive(Debug, Default)]
pub struct Wallets {
    balances: HashMap<Principal, Amount>,
}

impl Wallets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, holder: &Principal) -> Amount {
        self.balances.get(holder).copied().unwrap_or(Amount::ZERO)
    }

    pub fn credit(&mut self, holder: Principal, amount: Amount) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(&holder)
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;
        self.balances.insert(holder, balance);
        Ok(())
    }

    pub fn debit(&mut self, holder: Principal, amount: Amount) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(&holder)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;
        self.balances.insert(holder, balance);
        Ok(())
    }
}
