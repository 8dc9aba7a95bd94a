//! Response tally for a single oracle request.

use std::collections::{BTreeMap, BTreeSet};
use surety_types::{FlightKey, OracleIndex, Principal, StatusCode};

/// Lifecycle of an oracle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Accepting responses.
    Open,
    /// No longer accepting responses. `finalized` is the consensus code, or
    /// `None` if the request was superseded by a newer fetch.
    Closed { finalized: Option<StatusCode> },
}

/// Tracks responses to one `(flight, index)` status request.
///
/// Responses are tallied per status code, one per oracle. The request closes
/// the moment any code reaches `quorum` distinct responders.
#[derive(Debug, Clone)]
pub struct ResponseTracker {
    flight: FlightKey,
    index: OracleIndex,
    /// Responders grouped by status code.
    responders_by_code: BTreeMap<StatusCode, Vec<Principal>>,
    /// Every oracle that has answered, whatever its code.
    responders: BTreeSet<Principal>,
    quorum: u32,
    state: RequestState,
}

impl ResponseTracker {
    /// Create an open tracker that closes at `quorum` matching responses.
    pub fn new(flight: FlightKey, index: OracleIndex, quorum: u32) -> Self {
        Self {
            flight,
            index,
            responders_by_code: BTreeMap::new(),
            responders: BTreeSet::new(),
            quorum,
            state: RequestState::Open,
        }
    }

    pub fn flight(&self) -> &FlightKey {
        &self.flight
    }

    pub fn index(&self) -> OracleIndex {
        self.index
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == RequestState::Open
    }

    /// The consensus code, if the request closed with one.
    pub fn finalized(&self) -> Option<StatusCode> {
        match self.state {
            RequestState::Closed { finalized } => finalized,
            RequestState::Open => None,
        }
    }

    /// Whether `oracle` has already answered.
    pub fn has_responded(&self, oracle: &Principal) -> bool {
        self.responders.contains(oracle)
    }

    /// Record a response and close the request if `status` reaches quorum.
    ///
    /// Returns the consensus code when this response closes the request.
    /// Responses to a closed request and repeat answers from an oracle are
    /// ignored.
    pub fn add_response(&mut self, oracle: Principal, status: StatusCode) -> Option<StatusCode> {
        if !self.is_open() || !self.responders.insert(oracle) {
            return None;
        }
        let responders = self.responders_by_code.entry(status).or_default();
        responders.push(oracle);
        if responders.len() as u32 >= self.quorum {
            self.state = RequestState::Closed {
                finalized: Some(status),
            };
            return Some(status);
        }
        None
    }

    /// Close without a consensus code.
    pub fn supersede(&mut self) {
        if self.is_open() {
            self.state = RequestState::Closed { finalized: None };
        }
    }

    /// Number of responses recorded for `status`.
    pub fn responses_for(&self, status: StatusCode) -> u32 {
        self.responders_by_code
            .get(&status)
            .map(|r| r.len() as u32)
            .unwrap_or(0)
    }

    /// Responses recorded for each code that has any.
    pub fn tally(&self) -> BTreeMap<StatusCode, u32> {
        self.responders_by_code
            .iter()
            .map(|(code, responders)| (*code, responders.len() as u32))
            .collect()
    }

    /// Total responses across all codes.
    pub fn total_responses(&self) -> u32 {
        self.responders_by_code
            .values()
            .map(|r| r.len() as u32)
            .sum()
    }

    /// Get the quorum needed for this tracker.
    pub fn quorum_needed(&self) -> u32 {
        self.quorum
    }
}
