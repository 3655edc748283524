//! Per-transition view of world state.

use chrono::{DateTime, Utc};
use jurisfund_types::{AccountId, ProtocolEvent};

use crate::{EventLog, TokenLedger};

/// Everything a single state transition may touch outside its own module:
/// the token ledger, the event journal and the ledger time at which the
/// transition executes.
///
/// `now` is fixed for the whole transition, so every check inside one
/// operation sees the same instant.
pub struct LedgerCtx<'a> {
    pub tokens: &'a mut dyn TokenLedger,
    pub events: &'a mut EventLog,
    pub now: DateTime<Utc>,
}

impl<'a> LedgerCtx<'a> {
    #[must_use]
    pub fn new(
        tokens: &'a mut dyn TokenLedger,
        events: &'a mut EventLog,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tokens,
            events,
            now,
        }
    }

    /// Journal `event` at the transition time.
    pub fn emit(&mut self, emitter: AccountId, event: ProtocolEvent) -> u64 {
        self.events.emit(emitter, self.now, event)
    }
}
