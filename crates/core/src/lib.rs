//! Core types for the flight surety ledger: `Transaction`, `Receipt`,
//! `LedgerError` and the `StateMachine` trait.

mod error;
mod traits;
mod transaction;

pub use error::LedgerError;
pub use traits::{EntropySource, StateMachine};
pub use transaction::{Call, Receipt, Transaction};
