//! Read models assembled from the event log and current state.

use serde::{Deserialize, Serialize};
use surety_types::{Amount, FlightKey, OracleIndex, Principal, StatusCode};

/// A policy purchase joined with the flight's current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuredFlight {
    /// Sequence of the purchase event.
    pub sequence: u64,
    pub flight: FlightKey,
    pub passenger: Principal,
    pub amount: Amount,
    /// `Unknown` until the flight is finalized.
    pub status: StatusCode,
}

/// An opened oracle request joined with whether it still accepts responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequestView {
    /// Sequence of the request event.
    pub sequence: u64,
    pub flight: FlightKey,
    pub index: OracleIndex,
    pub open: bool,
    /// `Unknown` until the flight is finalized.
    pub status: StatusCode,
}
