//! Internally computed debt for `disburse`.
//!
//! Simple interest on the principal over the seconds elapsed since
//! initialization:
//!
//! ```text
//! D = principal + floor(principal * apr * elapsed_secs / (100 * days_per_year * 86400))
//! ```
//!
//! Evaluated exactly in `u128`. The principal is split into whole multiples
//! of the denominator plus a remainder, so the intermediate product stays
//! small even for 18-decimal assets held for years.

use chrono::{DateTime, Utc};
use jurisfund_types::{Amount, DayCount, JurisError, Result, constants};

/// Debt owed for `principal` at `apr` percent accrued from `since` to `now`.
///
/// A `now` earlier than `since` accrues nothing.
///
/// # Errors
/// Returns [`JurisError::ArithmeticOverflow`] if the debt does not fit in
/// an [`Amount`].
pub fn accrued_debt(
    principal: Amount,
    apr: u32,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
    day_count: DayCount,
) -> Result<Amount> {
    let elapsed = (now - since).num_seconds().max(0);
    let interest = accrued_interest(principal, apr, elapsed, day_count)?;
    principal
        .checked_add(interest)
        .ok_or(JurisError::ArithmeticOverflow("accrued debt"))
}

fn accrued_interest(
    principal: Amount,
    apr: u32,
    elapsed_secs: i64,
    day_count: DayCount,
) -> Result<Amount> {
    const WHAT: &str = "accrued interest";
    let year_secs = day_count.days_per_year() * constants::SECONDS_PER_DAY;
    let denominator = u128::from(year_secs.unsigned_abs()) * 100;
    let factor = u128::from(apr) * u128::from(elapsed_secs.unsigned_abs());

    // floor(P * f / d) == (P / d) * f + floor((P % d) * f / d)
    let whole = (principal / denominator)
        .checked_mul(factor)
        .ok_or(JurisError::ArithmeticOverflow(WHAT))?;
    let fraction = (principal % denominator)
        .checked_mul(factor)
        .ok_or(JurisError::ArithmeticOverflow(WHAT))?
        / denominator;
    whole
        .checked_add(fraction)
        .ok_or(JurisError::ArithmeticOverflow(WHAT))
}
