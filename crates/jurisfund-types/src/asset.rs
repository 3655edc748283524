//! Asset and amount primitives.
//!
//! Amounts are integer base units of the asset (e.g. 6 decimals for the
//! settlement token). Every share computation truncates toward zero.

/// Integer amount in the asset's base units.
pub type Amount = u128;

/// Type alias for asset identifiers (e.g., "JUSDC", "ETH").
pub type Asset = String;

/// Checked `a + b`, naming the computation on overflow.
///
/// # Errors
/// Returns [`crate::JurisError::ArithmeticOverflow`].
pub fn checked_add(a: Amount, b: Amount, what: &'static str) -> crate::Result<Amount> {
    a.checked_add(b)
        .ok_or(crate::JurisError::ArithmeticOverflow(what))
}

/// Checked `a * b`, naming the computation on overflow.
///
/// # Errors
/// Returns [`crate::JurisError::ArithmeticOverflow`].
pub fn checked_mul(a: Amount, b: Amount, what: &'static str) -> crate::Result<Amount> {
    a.checked_mul(b)
        .ok_or(crate::JurisError::ArithmeticOverflow(what))
}
