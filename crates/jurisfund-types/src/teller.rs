//! Treasury teller configuration and its cooldown clock.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Amount, constants};

/// Rate limits of the treasury teller.
///
/// Every privileged teller action requires
/// `now - last_action_at >= withdrawal_delay`; a successful action sets
/// `last_action_at = now`. `None` means no action has happened yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TellerConfig {
    pub withdrawal_delay: Duration,
    pub max_single_withdrawal: Amount,
    pub last_action_at: Option<DateTime<Utc>>,
}

impl Default for TellerConfig {
    fn default() -> Self {
        Self {
            withdrawal_delay: Duration::from_secs(constants::DEFAULT_WITHDRAWAL_DELAY_SECS),
            max_single_withdrawal: constants::DEFAULT_MAX_SINGLE_WITHDRAWAL,
            last_action_at: None,
        }
    }
}
