//! Oracle protocol for flight status consensus.
//!
//! Oracles stake a fee and receive three of ten index shards. A status fetch
//! opens a request on one shard; oracles holding that shard answer, and the
//! first code to gather `min_responses` matching answers is finalized.
//!
//! ```text
//! register_oracle ──► [i, j, k]
//!
//! fetch(flight) ──► OracleRequest{index} ──► responses ──► quorum ──► FlightStatusInfo
//!                         │
//!                         └─ refetch supersedes (Closed, no code)
//! ```

mod config;
mod index_registry;
mod requests;
mod response;

pub use config::OracleConfig;
pub use index_registry::{OracleIndexRegistry, INDICES_PER_ORACLE};
pub use requests::OracleRequestTracker;
pub use response::{RequestState, ResponseTracker};
