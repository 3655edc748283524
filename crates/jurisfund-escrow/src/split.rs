//! Settlement split.
//!
//! For a settlement balance `S`, a debt `D` and the fixed `markup`:
//!
//! ```text
//! lawyer     = floor(S * 30 / 100)
//! safe_cut   = floor(D * 3 / 100)
//! safe       = safe_cut + markup
//! originator = D - safe_cut
//! plaintiff  = S - D - markup - lawyer
//! ```
//!
//! The four shares always sum to exactly `S`. A settlement too small to
//! cover the debt, the markup and the lawyer leaves no plaintiff share and is
//! rejected.

use jurisfund_types::{Amount, JurisError, Result, SettlementSplit, asset, constants};

/// Split `settlement` between lawyer, safe, originator and plaintiff.
///
/// # Errors
/// Returns [`JurisError::NotEnoughFunds`] if the plaintiff remainder would be
/// negative, or [`JurisError::ArithmeticOverflow`].
pub fn compute_split(settlement: Amount, debt: Amount, markup: Amount) -> Result<SettlementSplit> {
    let lawyer = percent_of(settlement, constants::LAWYER_SHARE_PERCENT, "lawyer share")?;
    let safe_cut = percent_of(debt, constants::SAFE_DEBT_SHARE_PERCENT, "safe share")?;
    let safe = asset::checked_add(safe_cut, markup, "safe share")?;
    let originator = debt - safe_cut;

    let owed = asset::checked_add(debt, markup, "settlement claims")
        .and_then(|v| asset::checked_add(v, lawyer, "settlement claims"))?;
    let plaintiff = settlement
        .checked_sub(owed)
        .ok_or(JurisError::NotEnoughFunds {
            needed: owed,
            available: settlement,
        })?;

    Ok(SettlementSplit {
        settlement,
        debt,
        lawyer,
        safe,
        originator,
        plaintiff,
    })
}

fn percent_of(amount: Amount, percent: Amount, what: &'static str) -> Result<Amount> {
    Ok(asset::checked_mul(amount, percent, what)? / constants::PERCENT_DENOMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINCIPAL: Amount = 10_000 * 1_000_000;
    const MARKUP: Amount = 5_000_000;
    const SETTLEMENT: Amount = PRINCIPAL * 10 + MARKUP;

    #[test]
    fn split_for_observed_off_chain_debt() {
        let debt = 11_407_373_271;
        let split = compute_split(SETTLEMENT, debt, MARKUP).unwrap();
        assert_eq!(split.lawyer, 30_001_500_000);
        assert_eq!(split.safe, 342_221_198 + MARKUP);
        assert_eq!(split.originator, debt - 342_221_198);
        assert_eq!(
            split.plaintiff,
            SETTLEMENT - debt - MARKUP - 30_001_500_000
        );
    }

    #[test]
    fn shares_sum_to_settlement() {
        for (settlement, debt) in [
            (SETTLEMENT, PRINCIPAL),
            (SETTLEMENT + 7, PRINCIPAL + 333),
            (1_000_003, 10_001),
        ] {
            let split = compute_split(settlement, debt, 17).unwrap();
            assert_eq!(split.total_paid(), settlement);
            assert_eq!(split.residual(), 0);
        }
    }

    #[test]
    fn settlement_below_claims_rejected() {
        // lawyer takes 30, leaving 70 < debt 80 + markup
        let err = compute_split(100, 80, 1).unwrap_err();
        assert!(matches!(
            err,
            JurisError::NotEnoughFunds {
                needed: 111,
                available: 100
            }
        ));
    }

    #[test]
    fn exact_cover_leaves_zero_plaintiff() {
        let split = compute_split(100, 65, 5).unwrap();
        assert_eq!(split.plaintiff, 0);
        assert_eq!(split.total_paid(), 100);
    }
}
