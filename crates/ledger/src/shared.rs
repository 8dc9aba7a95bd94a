//! Thread-safe handle to a single ledger.

use crate::Ledger;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use surety_core::{LedgerError, Receipt, StateMachine, Transaction};

/// Cloneable handle that serializes every access to one [`Ledger`].
///
/// Each transaction is applied while holding the lock, so no two mutations
/// ever interleave. Reads take the same lock briefly.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Apply one transaction.
    pub fn submit(&self, tx: Transaction) -> Result<Receipt, LedgerError> {
        self.inner.lock().apply(tx)
    }

    /// Set the ledger clock, then apply one transaction under the same lock.
    pub fn submit_at(&self, now: Duration, tx: Transaction) -> Result<Receipt, LedgerError> {
        let mut ledger = self.inner.lock();
        ledger.set_time(now);
        ledger.apply(tx)
    }

    /// Run a read-only query.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Run an out-of-band mutation such as funding a wallet.
    pub fn write<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
