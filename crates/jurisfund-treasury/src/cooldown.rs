//! Shared cooldown clock of the treasury teller.
//!
//! Both `dispense` and `update_teller_config` are gated by one clock: an
//! action is allowed once `withdrawal_delay` has passed since the last
//! successful one. Before the first action everything is allowed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jurisfund_types::{JurisError, Result, time};

/// Last-action timestamp plus the delay it enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownClock {
    delay: Duration,
    last_action_at: Option<DateTime<Utc>>,
}

impl CooldownClock {
    #[must_use]
    pub fn new(delay: Duration, last_action_at: Option<DateTime<Utc>>) -> Self {
        Self {
            delay,
            last_action_at,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn last_action_at(&self) -> Option<DateTime<Utc>> {
        self.last_action_at
    }

    /// When the next action is allowed; `None` if no action happened yet.
    ///
    /// # Errors
    /// Returns [`JurisError::ArithmeticOverflow`] past the end of time.
    pub fn ready_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.last_action_at
            .map(|last| time::deadline(last, self.delay))
            .transpose()
    }

    /// Guard a privileged action at `now`.
    ///
    /// # Errors
    /// Returns [`JurisError::WithdrawalDelayNotReached`] inside the cooldown.
    pub fn check(&self, now: DateTime<Utc>) -> Result<()> {
        match self.ready_at()? {
            Some(ready_at) if now < ready_at => {
                Err(JurisError::WithdrawalDelayNotReached { ready_at })
            }
            _ => Ok(()),
        }
    }

    /// Record a successful action at `now`.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_action_at = Some(now);
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }
}
