//! Treasury teller.
//!
//! Releases treasury funds to borrowers on the safe's instruction. Every
//! privileged action passes three gates in order: the caller must be the
//! safe, the amount must not exceed the single-withdrawal ceiling, and the
//! shared cooldown must have elapsed.

use std::time::Duration;

use jurisfund_ledger::LedgerCtx;
use jurisfund_types::{AccountId, Amount, JurisError, ProtocolEvent, Result, TellerConfig, time};

use crate::CooldownClock;

/// Cooldown-gated dispenser over the treasury account.
#[derive(Debug, Clone)]
pub struct Teller {
    /// Account funds are dispensed from.
    treasury: AccountId,
    safe: AccountId,
    max_single_withdrawal: Amount,
    cooldown: CooldownClock,
}

impl Teller {
    /// # Errors
    /// Returns [`JurisError::Configuration`] for a zero ceiling or an
    /// out-of-range delay.
    pub fn new(treasury: AccountId, safe: AccountId, config: &TellerConfig) -> Result<Self> {
        validate_limits(config.withdrawal_delay, config.max_single_withdrawal)
            .map_err(|e| JurisError::Configuration(e.to_string()))?;
        Ok(Self {
            treasury,
            safe,
            max_single_withdrawal: config.max_single_withdrawal,
            cooldown: CooldownClock::new(config.withdrawal_delay, config.last_action_at),
        })
    }

    #[must_use]
    pub fn safe(&self) -> AccountId {
        self.safe
    }

    /// Current limits and the last action time.
    #[must_use]
    pub fn config(&self) -> TellerConfig {
        TellerConfig {
            withdrawal_delay: self.cooldown.delay(),
            max_single_withdrawal: self.max_single_withdrawal,
            last_action_at: self.cooldown.last_action_at(),
        }
    }

    /// Send `amount` of `asset` from the treasury to `to`.
    ///
    /// # Errors
    /// - `UnAuthorized` unless `caller` is the safe
    /// - `MaxSingleWithdrawalExceeded` above the ceiling
    /// - `WithdrawalDelayNotReached` inside the cooldown
    /// - balance errors if the treasury cannot cover it
    pub fn dispense(
        &mut self,
        caller: AccountId,
        asset: &str,
        to: AccountId,
        amount: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<()> {
        self.require_safe(caller)?;
        if amount > self.max_single_withdrawal {
            return Err(JurisError::MaxSingleWithdrawalExceeded {
                amount,
                max: self.max_single_withdrawal,
            });
        }
        self.cooldown.check(ctx.now)?;

        ctx.tokens.transfer(asset, self.treasury, to, amount)?;
        self.cooldown.record(ctx.now);

        tracing::info!(asset, to = %to, amount, "Treasury dispensed");
        ctx.emit(
            self.treasury,
            ProtocolEvent::Dispensed {
                asset: asset.to_string(),
                to,
                amount,
            },
        );
        Ok(())
    }

    /// Retune the teller limits. Counts as a privileged action: it is gated
    /// by the cooldown and restarts it.
    ///
    /// # Errors
    /// - `UnAuthorized` unless `caller` is the safe
    /// - `WithdrawalDelayNotReached` inside the cooldown
    /// - `InvalidArgument` for a zero ceiling or an out-of-range delay
    pub fn update_teller_config(
        &mut self,
        caller: AccountId,
        withdrawal_delay: Duration,
        max_single_withdrawal: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<()> {
        self.require_safe(caller)?;
        self.cooldown.check(ctx.now)?;
        validate_limits(withdrawal_delay, max_single_withdrawal)?;

        self.cooldown.set_delay(withdrawal_delay);
        self.max_single_withdrawal = max_single_withdrawal;
        self.cooldown.record(ctx.now);

        tracing::info!(
            withdrawal_delay_secs = withdrawal_delay.as_secs(),
            max_single_withdrawal,
            "Teller config updated"
        );
        ctx.emit(
            self.treasury,
            ProtocolEvent::TellerConfigUpdated {
                withdrawal_delay_secs: withdrawal_delay.as_secs(),
                max_single_withdrawal,
            },
        );
        Ok(())
    }

    fn require_safe(&self, caller: AccountId) -> Result<()> {
        if caller != self.safe {
            tracing::warn!(caller = %caller, "Teller call rejected");
            return Err(JurisError::UnAuthorized {
                caller,
                role: "safe",
            });
        }
        Ok(())
    }
}

fn validate_limits(delay: Duration, max_single_withdrawal: Amount) -> Result<()> {
    if max_single_withdrawal == 0 {
        return Err(JurisError::InvalidArgument {
            reason: "max single withdrawal must be > 0".into(),
        });
    }
    time::to_delta(delay).map_err(|_| JurisError::InvalidArgument {
        reason: format!("withdrawal delay {delay:?} out of range"),
    })?;
    Ok(())
}
