//! Flight delay insurance: premiums in, credit out.
//!
//! Passengers buy a capped policy on a flight. When the flight's status is
//! finalized as an airline-caused delay, every policy on it converts to
//! credit at the payout multiplier. Credit is withdrawn in full.

mod config;
mod escrow;

pub use config::EscrowConfig;
pub use escrow::{InsuranceEscrow, Policy};
