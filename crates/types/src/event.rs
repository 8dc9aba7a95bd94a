//! Events appended to the ledger's log.

use crate::{Amount, BlockHeight, FlightKey, OracleIndex, Principal, StatusCode};
use serde::{Deserialize, Serialize};

/// A state transition observable by off-ledger readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// An airline crossed into the registered set.
    AirlineRegistered { airline: Principal, name: String },

    /// A passenger bought a policy on a flight.
    FlightInsurancePurchased {
        flight: FlightKey,
        passenger: Principal,
        amount: Amount,
    },

    /// An oracle request was opened on an index shard.
    OracleRequest { index: OracleIndex, flight: FlightKey },

    /// Oracles reached quorum on a flight's status.
    FlightStatusInfo { flight: FlightKey, status: StatusCode },
}

impl LedgerEvent {
    /// Get the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::AirlineRegistered { .. } => EventKind::AirlineRegistered,
            LedgerEvent::FlightInsurancePurchased { .. } => EventKind::FlightInsurancePurchased,
            LedgerEvent::OracleRequest { .. } => EventKind::OracleRequest,
            LedgerEvent::FlightStatusInfo { .. } => EventKind::FlightStatusInfo,
        }
    }

    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Discriminant of [`LedgerEvent`], used to filter range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    AirlineRegistered,
    FlightInsurancePurchased,
    OracleRequest,
    FlightStatusInfo,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::AirlineRegistered => "AirlineRegistered",
            EventKind::FlightInsurancePurchased => "FlightInsurancePurchased",
            EventKind::OracleRequest => "OracleRequest",
            EventKind::FlightStatusInfo => "FlightStatusInfo",
        }
    }
}

/// An event together with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Zero-based position in the log. Dense and strictly increasing.
    pub sequence: u64,
    /// Block in which the event was emitted.
    pub height: BlockHeight,
    pub event: LedgerEvent,
}
