//! Conversions between configured `std::time::Duration`s and ledger time.
//!
//! All time comparisons are against the ledger clock's `DateTime<Utc>`,
//! never against a local timer.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{JurisError, Result};

/// Convert a configured duration to a chrono delta.
///
/// # Errors
/// Returns [`JurisError::Configuration`] if the duration is out of range.
pub fn to_delta(duration: Duration) -> Result<TimeDelta> {
    TimeDelta::from_std(duration)
        .map_err(|e| JurisError::Configuration(format!("duration {duration:?}: {e}")))
}

/// `since + duration`, the earliest instant at which `duration` has elapsed.
///
/// # Errors
/// Returns [`JurisError::ArithmeticOverflow`] past the end of representable time.
pub fn deadline(since: DateTime<Utc>, duration: Duration) -> Result<DateTime<Utc>> {
    since
        .checked_add_signed(to_delta(duration)?)
        .ok_or(JurisError::ArithmeticOverflow("deadline"))
}
