//! Airline governance.
//!
//! Keeps the authoritative airline registry and admits new airlines by
//! quorum vote once the federation has grown past its founding members.
//!
//! # Lifecycle
//!
//! ```text
//!  (unregistered) ──nominate──► Candidate ──quorum──► Registered ──fee──► Participating
//!        │                                                ▲
//!        └────────── below pre-consensus threshold ───────┘
//! ```
//!
//! Only participating airlines vote, and each votes at most once per
//! candidate.

mod config;
mod registry;
mod voting;

pub use config::GovernanceConfig;
pub use registry::{Airline, AirlineRegistry, AirlineState};
pub use voting::{quorum, CandidateVotes};
