//! Append-only event journal.
//!
//! Each [`EventRecord`] fires once per corresponding transition; one
//! operation may append several. A failed transaction truncates the journal
//! back to its previous length, so events of a reverted operation never
//! become visible.

use chrono::{DateTime, Utc};
use jurisfund_types::{AccountId, EventId, EventRecord, ProtocolEvent};

/// Ordered list of emitted events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn emit(&mut self, emitter: AccountId, at: DateTime<Utc>, event: ProtocolEvent) -> u64 {
        let sequence = self.records.len() as u64;
        tracing::debug!(
            sequence,
            emitter = %emitter,
            event = event.name(),
            "Event emitted"
        );
        self.records.push(EventRecord {
            id: EventId::new(),
            sequence,
            emitter,
            at,
            event,
        });
        sequence
    }

    /// All events, oldest first.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of events of the given kind (see [`ProtocolEvent::name`]).
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.event.name() == name)
            .count()
    }

    #[must_use]
    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Drop every event from `len` on. Used to discard the events of a
    /// reverted transaction.
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Events with a sequence number of at least `sequence`.
    #[must_use]
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = usize::try_from(sequence)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispensed(amount: u128) -> ProtocolEvent {
        ProtocolEvent::Dispensed {
            asset: "JUSDC".into(),
            to: AccountId::random(),
            amount,
        }
    }

    #[test]
    fn sequences_are_dense() {
        let mut log = EventLog::new();
        let now = Utc::now();
        assert_eq!(log.emit(AccountId::ZERO, now, dispensed(1)), 0);
        assert_eq!(log.emit(AccountId::ZERO, now, dispensed(2)), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().sequence, 1);
    }

    #[test]
    fn count_by_name() {
        let mut log = EventLog::new();
        let now = Utc::now();
        log.emit(AccountId::ZERO, now, dispensed(1));
        log.emit(
            AccountId::ZERO,
            now,
            ProtocolEvent::TellerConfigUpdated {
                withdrawal_delay_secs: 60,
                max_single_withdrawal: 1,
            },
        );
        assert_eq!(log.count("Dispensed"), 1);
        assert_eq!(log.count("TellerConfigUpdated"), 1);
        assert_eq!(log.count("Staked"), 0);
    }

    #[test]
    fn since_slices_tail() {
        let mut log = EventLog::new();
        let now = Utc::now();
        for i in 0..5 {
            log.emit(AccountId::ZERO, now, dispensed(i));
        }
        assert_eq!(log.since(3).len(), 2);
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn truncate_then_emit_reuses_sequence() {
        let mut log = EventLog::new();
        let now = Utc::now();
        log.emit(AccountId::ZERO, now, dispensed(1));
        log.emit(AccountId::ZERO, now, dispensed(2));
        log.truncate(1);
        assert_eq!(log.emit(AccountId::ZERO, now, dispensed(3)), 1);
    }

    #[test]
    fn records_serialize() {
        let mut log = EventLog::new();
        log.emit(AccountId::ZERO, Utc::now(), dispensed(7));
        let json = serde_json::to_string(log.records()).unwrap();
        assert!(json.contains("\"dispensed\""));
    }
}
