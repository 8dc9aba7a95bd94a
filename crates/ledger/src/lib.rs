//! Flight surety ledger.
//!
//! A single deterministic state machine holding airline governance, oracle
//! index shards and requests, insurance policies, passenger credit and the
//! wallets value moves between.
//!
//! # Transaction flow
//!
//! ```text
//! Transaction{caller, value, call}
//!     │
//!     ├─ owner-only? ── caller must be owner
//!     ├─ operational? authorized app layer?
//!     ├─ wallet covers value + gas?
//!     ▼
//! debit value ──► dispatch ──┬─ Err ──► restore value, no trace
//!                            └─ Ok ───► refund/payout, charge gas,
//!                                       seal block, append events
//! ```

mod config;
mod entropy;
mod events;
mod ledger;
mod shared;
mod views;
mod wallets;

pub use config::{FlightValidation, GenesisConfig, LedgerConfig};
pub use entropy::ChainEntropy;
pub use events::EventLog;
pub use ledger::Ledger;
pub use shared::SharedLedger;
pub use views::{InsuredFlight, OracleRequestView};
pub use wallets::Wallets;
