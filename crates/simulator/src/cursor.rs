//! Incremental reader over the ledger's event log.

use surety_ledger::SharedLedger;
use surety_types::LoggedEvent;

/// Remembers the next event sequence to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventCursor {
    next: u64,
}

impl EventCursor {
    /// A cursor at the start of the log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events appended since the last poll.
    pub fn poll(&mut self, ledger: &SharedLedger) -> Vec<LoggedEvent> {
        let events = ledger.read(|l| l.events().since(self.next).to_vec());
        self.next += events.len() as u64;
        events
    }

    pub fn position(&self) -> u64 {
        self.next
    }
}
