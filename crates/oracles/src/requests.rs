//! Flight status requests and their consensus.
//!
//! A fetch opens a request on one index shard. Only oracles holding that
//! index may answer, and the first status code to collect `min_responses`
//! matching answers becomes the flight's finalized status.

use crate::{OracleIndexRegistry, ResponseTracker};
use std::collections::HashMap;
use surety_core::{EntropySource, LedgerError};
use surety_types::{FlightKey, LedgerEvent, OracleIndex, Principal, StatusCode};
use tracing::{debug, info};

/// Tracks every status request the ledger has opened.
#[derive(Debug)]
pub struct OracleRequestTracker {
    min_responses: u32,
    /// All requests ever opened, open or closed.
    requests: HashMap<(FlightKey, OracleIndex), ResponseTracker>,
    /// The index of the most recent request per flight.
    latest: HashMap<FlightKey, OracleIndex>,
    /// Consensus codes of finalized flights.
    finalized: HashMap<FlightKey, StatusCode>,
}

impl OracleRequestTracker {
    pub fn new(min_responses: u32) -> Self {
        Self {
            min_responses: min_responses.max(1),
            requests: HashMap::new(),
            latest: HashMap::new(),
            finalized: HashMap::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Fetch
    // ═══════════════════════════════════════════════════════════════════════

    /// Check that a new request may be opened for `flight`.
    pub fn check_fetch(&self, flight: &FlightKey) -> Result<(), LedgerError> {
        if self.finalized.contains_key(flight) {
            return Err(LedgerError::StatusAlreadyFinalized);
        }
        Ok(())
    }

    /// Open a request for `flight` on an index drawn from `entropy`.
    ///
    /// An earlier open request for the flight on another index is closed
    /// without a code. Drawing the index of the request that is already open
    /// keeps its responses.
    pub fn open(
        &mut self,
        flight: FlightKey,
        requester: Principal,
        entropy: &mut dyn EntropySource,
    ) -> Result<LedgerEvent, LedgerError> {
        self.check_fetch(&flight)?;

        let index = OracleIndex::from_hash(&entropy.draw(&requester));

        if let Some(previous) = self.latest.insert(flight.clone(), index) {
            if previous != index {
                if let Some(old) = self.requests.get_mut(&(flight.clone(), previous)) {
                    if old.is_open() {
                        old.supersede();
                        debug!(flight = %flight, index = previous.get(), "Superseded oracle request");
                    }
                }
            }
        }

        let key = (flight.clone(), index);
        let reuse = self.requests.get(&key).is_some_and(ResponseTracker::is_open);
        if !reuse {
            self.requests.insert(
                key,
                ResponseTracker::new(flight.clone(), index, self.min_responses),
            );
        }

        info!(
            flight = %flight,
            index = index.get(),
            requester = %requester.short(),
            "Oracle request opened"
        );
        Ok(LedgerEvent::OracleRequest { index, flight })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Responses
    // ═══════════════════════════════════════════════════════════════════════

    /// Check that `oracle` may answer the request for `(flight, index)`.
    pub fn check_response(
        &self,
        index: OracleIndex,
        flight: &FlightKey,
        oracle: &Principal,
        registry: &OracleIndexRegistry,
    ) -> Result<(), LedgerError> {
        if !registry.is_assigned(oracle, index) {
            return Err(LedgerError::NotAssignedToIndex { index });
        }
        match self.requests.get(&(flight.clone(), index)) {
            Some(request) if request.is_open() => {
                if request.has_responded(oracle) {
                    return Err(LedgerError::DuplicateResponse);
                }
                Ok(())
            }
            _ => Err(LedgerError::RequestClosed),
        }
    }

    /// Record `oracle`'s answer.
    ///
    /// Returns the finalized code if this answer reached quorum. Each oracle
    /// answers a request at most once.
    pub fn submit_response(
        &mut self,
        index: OracleIndex,
        flight: &FlightKey,
        status: StatusCode,
        oracle: Principal,
        registry: &OracleIndexRegistry,
    ) -> Result<Option<StatusCode>, LedgerError> {
        self.check_response(index, flight, &oracle, registry)?;

        let tracker = self
            .requests
            .get_mut(&(flight.clone(), index))
            .ok_or(LedgerError::RequestClosed)?;
        let finalized = tracker.add_response(oracle, status);

        debug!(
            flight = %flight,
            index = index.get(),
            oracle = %oracle.short(),
            status = ?status,
            count = tracker.responses_for(status),
            "Oracle response recorded"
        );

        if let Some(code) = finalized {
            self.finalized.insert(flight.clone(), code);
            info!(flight = %flight, index = index.get(), status = ?code, "Flight status finalized");
        }
        Ok(finalized)
    }

    /// Whether one more `status` answer would finalize the request.
    pub fn would_finalize(&self, index: OracleIndex, flight: &FlightKey, status: StatusCode) -> bool {
        self.requests
            .get(&(flight.clone(), index))
            .is_some_and(|r| r.is_open() && r.responses_for(status) + 1 >= r.quorum_needed())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn is_open_for_index(&self, flight: &FlightKey, index: OracleIndex) -> bool {
        self.requests
            .get(&(flight.clone(), index))
            .is_some_and(ResponseTracker::is_open)
    }

    /// Finalized status of `flight`, `Unknown` until consensus.
    pub fn flight_status(&self, flight: &FlightKey) -> StatusCode {
        self.finalized_status(flight).unwrap_or(StatusCode::Unknown)
    }

    pub fn finalized_status(&self, flight: &FlightKey) -> Option<StatusCode> {
        self.finalized.get(flight).copied()
    }

    /// The most recent request opened for `flight`.
    pub fn request(&self, flight: &FlightKey) -> Option<&ResponseTracker> {
        let index = self.latest.get(flight)?;
        self.requests.get(&(flight.clone(), *index))
    }

    /// The request for `flight` on a specific index.
    pub fn request_at(&self, flight: &FlightKey, index: OracleIndex) -> Option<&ResponseTracker> {
        self.requests.get(&(flight.clone(), index))
    }

    pub fn min_responses(&self) -> u32 {
        self.min_responses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestState;
    use surety_types::{Amount, Hash};
    use tracing_test::traced_test;

    /// Replays a fixed sequence of indices.
    struct ScriptedEntropy(Vec<u64>);

    impl EntropySource for ScriptedEntropy {
        fn draw(&mut self, _caller: &Principal) -> Hash {
            let next = self.0.remove(0);
            let mut bytes = [0u8; 32];
            bytes[..8].copy_from_slice(&next.to_le_bytes());
            Hash::from_raw(bytes)
        }

        fn advance(&mut self, _block: &[u8]) {}
    }

    fn index(i: u8) -> OracleIndex {
        OracleIndex::new(i).unwrap()
    }

    fn flight() -> FlightKey {
        FlightKey::new(Principal::from_label("airline"), "123", 1_700_000_000)
    }

    /// Registry where oracles `1..=count` all hold the index the scripted
    /// entropy gives them.
    fn registry_on(i: u64, count: u64) -> OracleIndexRegistry {
        let mut registry = OracleIndexRegistry::new(Amount::ether(1));
        for seed in 1..=count {
            let mut entropy = ScriptedEntropy(vec![i, i, i]);
            registry
                .register_oracle(Principal::from_seed(seed), Amount::ether(1), &mut entropy)
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_scripted_entropy_maps_to_index() {
        let mut entropy = ScriptedEntropy(vec![7]);
        let hash = entropy.draw(&Principal::from_label("x"));
        assert_eq!(OracleIndex::from_hash(&hash), index(7));
    }

    #[traced_test]
    #[test]
    fn test_open_emits_request_event() {
        let mut tracker = OracleRequestTracker::new(3);
        let requester = Principal::from_label("passenger");

        let event = tracker
            .open(flight(), requester, &mut ScriptedEntropy(vec![4]))
            .unwrap();
        assert_eq!(
            event,
            LedgerEvent::OracleRequest {
                index: index(4),
                flight: flight()
            }
        );
        assert!(tracker.is_open_for_index(&flight(), index(4)));
        assert!(!tracker.is_open_for_index(&flight(), index(5)));
        assert_eq!(tracker.flight_status(&flight()), StatusCode::Unknown);
    }

    #[traced_test]
    #[test]
    fn test_quorum_finalizes_and_closes() {
        let registry = registry_on(4, 5);
        let mut tracker = OracleRequestTracker::new(3);
        tracker
            .open(flight(), Principal::from_label("p"), &mut ScriptedEntropy(vec![4]))
            .unwrap();

        let answers = [
            (1, StatusCode::OnTime),
            (2, StatusCode::LateAirline),
            (3, StatusCode::LateWeather),
            (4, StatusCode::LateAirline),
        ];
        for (seed, status) in answers {
            let result = tracker
                .submit_response(index(4), &flight(), status, Principal::from_seed(seed), &registry)
                .unwrap();
            assert_eq!(result, None);
        }
        let result = tracker
            .submit_response(
                index(4),
                &flight(),
                StatusCode::LateAirline,
                Principal::from_seed(5),
                &registry,
            )
            .unwrap();

        assert_eq!(result, Some(StatusCode::LateAirline));
        assert_eq!(tracker.flight_status(&flight()), StatusCode::LateAirline);
        assert!(!tracker.is_open_for_index(&flight(), index(4)));
    }

    #[traced_test]
    #[test]
    fn test_responses_after_close_are_rejected() {
        let registry = registry_on(2, 4);
        let mut tracker = OracleRequestTracker::new(3);
        tracker
            .open(flight(), Principal::from_label("p"), &mut ScriptedEntropy(vec![2]))
            .unwrap();

        for seed in 1..=3 {
            tracker
                .submit_response(index(2), &flight(), StatusCode::OnTime, Principal::from_seed(seed), &registry)
                .unwrap();
        }
        assert_eq!(
            tracker.submit_response(
                index(2),
                &flight(),
                StatusCode::OnTime,
                Principal::from_seed(4),
                &registry
            ),
            Err(LedgerError::RequestClosed)
        );
    }

    #[traced_test]
    #[test]
    fn test_one_oracle_cannot_reach_quorum_alone() {
        let registry = registry_on(5, 3);
        let mut tracker = OracleRequestTracker::new(3);
        tracker
            .open(flight(), Principal::from_label("p"), &mut ScriptedEntropy(vec![5]))
            .unwrap();
        let oracle = Principal::from_seed(1);

        tracker
            .submit_response(index(5), &flight(), StatusCode::LateAirline, oracle, &registry)
            .unwrap();
        for _ in 0..2 {
            assert_eq!(
                tracker.submit_response(index(5), &flight(), StatusCode::LateAirline, oracle, &registry),
                Err(LedgerError::DuplicateResponse)
            );
        }
        assert!(tracker.is_open_for_index(&flight(), index(5)));
        assert!(!tracker.would_finalize(index(5), &flight(), StatusCode::LateAirline));
        assert_eq!(tracker.flight_status(&flight()), StatusCode::Unknown);

        for seed in 2..=3 {
            tracker
                .submit_response(index(5), &flight(), StatusCode::LateAirline, Principal::from_seed(seed), &registry)
                .unwrap();
        }
        assert_eq!(tracker.flight_status(&flight()), StatusCode::LateAirline);
    }

    #[traced_test]
    #[test]
    fn test_unassigned_oracle_rejected() {
        let registry = registry_on(2, 1);
        let mut tracker = OracleRequestTracker::new(3);
        tracker
            .open(flight(), Principal::from_label("p"), &mut ScriptedEntropy(vec![2]))
            .unwrap();

        // Registered but holding a different index.
        assert_eq!(
            tracker.submit_response(
                index(3),
                &flight(),
                StatusCode::OnTime,
                Principal::from_seed(1),
                &registry
            ),
            Err(LedgerError::NotAssignedToIndex { index: index(3) })
        );
        // Never registered.
        assert_eq!(
            tracker.submit_response(
                index(2),
                &flight(),
                StatusCode::OnTime,
                Principal::from_label("stranger"),
                &registry
            ),
            Err(LedgerError::NotAssignedToIndex { index: index(2) })
        );
    }

    #[traced_test]
    #[test]
    fn test_assigned_oracle_without_request_gets_closed() {
        let registry = registry_on(6, 1);
        let tracker = OracleRequestTracker::new(3);

        assert_eq!(
            tracker.check_response(index(6), &flight(), &Principal::from_seed(1), &registry),
            Err(LedgerError::RequestClosed)
        );
    }

    #[traced_test]
    #[test]
    fn test_refetch_supersedes_previous_index() {
        let mut tracker = OracleRequestTracker::new(3);
        let requester = Principal::from_label("p");
        let mut entropy = ScriptedEntropy(vec![1, 8]);

        tracker.open(flight(), requester, &mut entropy).unwrap();
        tracker.open(flight(), requester, &mut entropy).unwrap();

        assert!(!tracker.is_open_for_index(&flight(), index(1)));
        assert!(tracker.is_open_for_index(&flight(), index(8)));
        assert_eq!(
            tracker.request_at(&flight(), index(1)).map(|r| r.state()),
            Some(RequestState::Closed { finalized: None })
        );
        assert_eq!(tracker.request(&flight()).map(|r| r.index()), Some(index(8)));
    }

    #[traced_test]
    #[test]
    fn test_refetch_on_same_index_keeps_responses() {
        let registry = registry_on(3, 2);
        let mut tracker = OracleRequestTracker::new(3);
        let requester = Principal::from_label("p");
        let mut entropy = ScriptedEntropy(vec![3, 3]);

        tracker.open(flight(), requester, &mut entropy).unwrap();
        tracker
            .submit_response(index(3), &flight(), StatusCode::OnTime, Principal::from_seed(1), &registry)
            .unwrap();
        tracker.open(flight(), requester, &mut entropy).unwrap();

        let request = tracker.request(&flight()).unwrap();
        assert!(request.is_open());
        assert_eq!(request.responses_for(StatusCode::OnTime), 1);
    }

    #[traced_test]
    #[test]
    fn test_fetch_after_finalization_rejected() {
        let registry = registry_on(0, 1);
        let mut tracker = OracleRequestTracker::new(1);
        let requester = Principal::from_label("p");
        let mut entropy = ScriptedEntropy(vec![0, 0]);

        tracker.open(flight(), requester, &mut entropy).unwrap();
        tracker
            .submit_response(index(0), &flight(), StatusCode::LateTechnical, Principal::from_seed(1), &registry)
            .unwrap();

        assert_eq!(
            tracker.open(flight(), requester, &mut entropy),
            Err(LedgerError::StatusAlreadyFinalized)
        );
        assert_eq!(tracker.finalized_status(&flight()), Some(StatusCode::LateTechnical));
    }
}
