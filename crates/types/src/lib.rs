//! Core types for the flight surety ledger.
//!
//! Identities, amounts, flights, status codes and ledger events shared by
//! every other crate in the workspace.

mod amount;
mod event;
mod flight;
mod hash;
mod identifiers;

pub use amount::{Amount, AmountParseError};
pub use event::{EventKind, LedgerEvent, LoggedEvent};
pub use flight::{FlightKey, InvalidStatusCode, StatusCode};
pub use hash::{Hash, HexError};
pub use identifiers::{BlockHeight, InvalidOracleIndex, OracleIndex, Principal};
