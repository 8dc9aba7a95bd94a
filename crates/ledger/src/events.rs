//! Append-only event log.

use surety_types::{BlockHeight, EventKind, LedgerEvent, LoggedEvent};

/// Every event the ledger has emitted, in emission order.
///
/// Sequence numbers are dense and start at zero, so a reader that remembers
/// the next sequence it expects can resume with [`EventLog::since`].
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number.
    pub fn append(&mut self, height: BlockHeight, event: LedgerEvent) -> u64 {
        let sequence = self.entries.len() as u64;
        self.entries.push(LoggedEvent {
            sequence,
            height,
            event,
        });
        sequence
    }

    /// Events with `from <= sequence < to`. Out-of-range bounds are clamped.
    pub fn range(&self, from: u64, to: u64) -> &[LoggedEvent] {
        let len = self.entries.len();
        let end = (to.min(len as u64)) as usize;
        let start = (from as usize).min(end);
        &self.entries[start..end]
    }

    /// Events from `cursor` onwards.
    pub fn since(&self, cursor: u64) -> &[LoggedEvent] {
        self.range(cursor, u64::MAX)
    }

    /// Events of one kind, in order.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter().filter(move |e| e.event.kind() == kind)
    }

    /// Sequence number the next event will get.
    pub fn next_sequence(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_types::{FlightKey, OracleIndex, Principal, StatusCode};

    fn registered(label: &str) -> LedgerEvent {
        LedgerEvent::AirlineRegistered {
            airline: Principal::from_label(label),
            name: label.to_string(),
        }
    }

    #[test]
    fn test_sequences_are_dense() {
        let mut log = EventLog::new();
        assert_eq!(log.append(BlockHeight(1), registered("a")), 0);
        assert_eq!(log.append(BlockHeight(1), registered("b")), 1);
        assert_eq!(log.append(BlockHeight(2), registered("c")), 2);
        assert_eq!(log.next_sequence(), 3);
    }

    #[test]
    fn test_range_clamps() {
        let mut log = EventLog::new();
        for label in ["a", "b", "c", "d"] {
            log.append(BlockHeight(1), registered(label));
        }

        assert_eq!(log.range(1, 3).len(), 2);
        assert_eq!(log.range(1, 3)[0].sequence, 1);
        assert_eq!(log.range(3, 100).len(), 1);
        assert!(log.range(10, 20).is_empty());
        assert!(log.range(3, 1).is_empty());
        assert_eq!(log.since(2).len(), 2);
        assert!(log.since(4).is_empty());
    }

    #[test]
    fn test_of_kind_filters() {
        let mut log = EventLog::new();
        let flight = FlightKey::new(Principal::from_label("a"), "1", 0);
        log.append(BlockHeight(1), registered("a"));
        log.append(
            BlockHeight(2),
            LedgerEvent::OracleRequest {
                index: OracleIndex::new(3).unwrap(),
                flight: flight.clone(),
            },
        );
        log.append(
            BlockHeight(3),
            LedgerEvent::FlightStatusInfo {
                flight,
                status: StatusCode::OnTime,
            },
        );

        let requests: Vec<_> = log.of_kind(EventKind::OracleRequest).collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].height, BlockHeight(2));
    }
}
