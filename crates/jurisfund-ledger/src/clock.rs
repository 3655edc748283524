//! Ledger clock.
//!
//! Time is a piece of world state: every "has the delay elapsed" check
//! compares against the last observed ledger time, never a local timer.
//! The clock only moves forward.

use chrono::{DateTime, TimeDelta, Utc};
use jurisfund_types::{JurisError, Result};

/// Monotonic, non-decreasing ledger time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerClock {
    now: DateTime<Utc>,
}

impl LedgerClock {
    /// Start the clock at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: start }
    }

    /// Current ledger time.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Move the clock forward by `delta`.
    ///
    /// # Errors
    /// Returns [`JurisError::ClockRegression`] for a negative delta and
    /// [`JurisError::ArithmeticOverflow`] past the end of representable time.
    pub fn advance(&mut self, delta: TimeDelta) -> Result<DateTime<Utc>> {
        let target = self
            .now
            .checked_add_signed(delta)
            .ok_or(JurisError::ArithmeticOverflow("clock advance"))?;
        self.advance_to(target)
    }

    /// Move the clock to `target`. Setting the current time again is a no-op.
    ///
    /// # Errors
    /// Returns [`JurisError::ClockRegression`] if `target` is in the past.
    pub fn advance_to(&mut self, target: DateTime<Utc>) -> Result<DateTime<Utc>> {
        if target < self.now {
            return Err(JurisError::ClockRegression {
                current: self.now,
                requested: target,
            });
        }
        self.now = target;
        Ok(self.now)
    }
}

impl Default for LedgerClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}
