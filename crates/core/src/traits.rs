//! Core traits for the ledger state machine.

use crate::{LedgerError, Receipt, Transaction};
use std::time::Duration;
use surety_types::{Hash, Principal};

/// A state machine that applies transactions.
///
/// This is the core abstraction for the ledger. Every component that owns
/// authoritative state is driven through it:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + transaction = same receipt
/// - **All-or-nothing**: A rejected transaction leaves no trace in state
///
/// # Example
///
/// ```ignore
/// impl StateMachine for Ledger {
///     fn apply(&mut self, tx: Transaction) -> Result<Receipt, LedgerError> {
///         match tx.call {
///             Call::PayAirlineFee => self.pay_airline_fee(tx.caller, tx.value),
///             // ... etc
///         }
///     }
///
///     fn set_time(&mut self, now: Duration) {
///         self.now = now;
///     }
/// }
/// ```
pub trait StateMachine {
    /// Apply a transaction, returning its receipt.
    ///
    /// # Guarantees
    ///
    /// - **Synchronous**: This method never blocks or awaits
    /// - **Deterministic**: Given the same state and transaction, always
    ///   returns the same result
    /// - **Atomic**: On `Err`, state is exactly as it was before the call
    fn apply(&mut self, tx: Transaction) -> Result<Receipt, LedgerError>;

    /// Set the current time.
    ///
    /// Called by the runner before `apply()` to provide the current
    /// simulation or wall-clock time.
    fn set_time(&mut self, now: Duration);

    /// Get the current time.
    ///
    /// Returns the time that was last set via `set_time()`.
    fn now(&self) -> Duration;
}

/// Source of unpredictable-but-verifiable values for the ledger.
///
/// The ledger draws oracle indices and request shards from this. An
/// implementation must be deterministic given the ledger's history so that
/// replaying the same transactions reproduces the same draws.
pub trait EntropySource: Send {
    /// Draw a value bound to `caller`. Successive draws differ.
    fn draw(&mut self, caller: &Principal) -> Hash;

    /// Mix an applied block into the source.
    fn advance(&mut self, block: &[u8]);
}
