//! Escrow unit logic.
//!
//! One [`EscrowImplementation`] serves every escrow: the per-case state
//! lives in an [`EscrowRecord`] stored by the registry, and each operation
//! takes that record explicitly. Every operation validates completely
//! before it moves a token or touches the record.

use chrono::{DateTime, TimeDelta, Utc};
use jurisfund_ledger::{LedgerCtx, TokenLedger};
use jurisfund_types::{
    AccountId, Amount, DayCount, EscrowInit, EscrowRecord, EscrowSettings, EscrowStatus,
    JurisError, ProtocolEvent, Result, SettlementSplit, asset, constants, time,
};

use crate::{accrual, split};

/// The shared escrow logic every deployed escrow delegates to.
#[derive(Debug, Clone)]
pub struct EscrowImplementation {
    id: AccountId,
    markup: Amount,
    holding_period: TimeDelta,
    day_count: DayCount,
}

impl EscrowImplementation {
    #[must_use]
    pub fn new(id: AccountId, markup: Amount, holding_period: TimeDelta, day_count: DayCount) -> Self {
        Self {
            id,
            markup,
            holding_period,
            day_count,
        }
    }

    /// Build from configured settings.
    ///
    /// # Errors
    /// Returns [`JurisError::Configuration`] if the holding period is out of range.
    pub fn from_settings(id: AccountId, settings: &EscrowSettings) -> Result<Self> {
        Ok(Self::new(
            id,
            settings.markup,
            time::to_delta(settings.holding_period)?,
            settings.day_count,
        ))
    }

    #[must_use]
    pub fn id(&self) -> AccountId {
        self.id
    }

    #[must_use]
    pub fn markup(&self) -> Amount {
        self.markup
    }

    #[must_use]
    pub fn holding_period(&self) -> TimeDelta {
        self.holding_period
    }

    #[must_use]
    pub fn day_count(&self) -> DayCount {
        self.day_count
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Set the case terms and move the escrow to ACTIVE. The caller becomes
    /// the originator.
    ///
    /// # Errors
    /// - `AlreadyInitialized` unless the record is UNINITIALIZED
    /// - `InvalidApr` if `apr` is not a multiple of 3
    /// - `InvalidArgument` for an empty token or a zero safe
    pub fn initialize(
        &self,
        record: &mut EscrowRecord,
        caller: AccountId,
        init: &EscrowInit,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<()> {
        if record.status != EscrowStatus::Uninitialized {
            return Err(JurisError::AlreadyInitialized(record.address));
        }
        if init.apr % constants::APR_STEP != 0 {
            return Err(JurisError::InvalidApr(init.apr));
        }
        if init.token.is_empty() {
            return Err(JurisError::InvalidArgument {
                reason: "escrow token must be set".into(),
            });
        }
        if init.safe.is_zero() {
            return Err(JurisError::InvalidArgument {
                reason: "escrow safe must be non-zero".into(),
            });
        }

        record.principal = init.principal;
        record.apr = init.apr;
        record.plaintiff = init.plaintiff;
        record.lawyer = init.lawyer;
        record.safe = init.safe;
        record.token.clone_from(&init.token);
        record.originator = caller;
        record.markup = self.markup;
        record.created_at = Some(ctx.now);
        record.mark_active()?;

        tracing::info!(
            escrow = %record.address,
            principal = record.principal,
            apr = record.apr,
            originator = %caller,
            "Escrow initialized"
        );
        ctx.emit(
            record.address,
            ProtocolEvent::EscrowInitialized {
                escrow: record.address,
                principal: record.principal,
                apr: record.apr,
                plaintiff: record.plaintiff,
                lawyer: record.lawyer,
                originator: record.originator,
                safe: record.safe,
                token: record.token.clone(),
            },
        );
        Ok(())
    }

    /// Pull `amount` of the escrow token from `from` (which must have
    /// approved the escrow). The resulting balance must reach the settlement
    /// threshold. Returns the new balance.
    ///
    /// # Errors
    /// - `NotInitialized` / `AlreadySettled` unless ACTIVE
    /// - `NotEnoughFunds` if the resulting balance is below the threshold
    /// - allowance or balance errors from the token ledger
    pub fn deposit(
        &self,
        record: &EscrowRecord,
        from: AccountId,
        amount: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<Amount> {
        require_active(record)?;
        let threshold = record.settlement_threshold()?;
        let current = ctx.tokens.balance_of(&record.token, record.address);
        let resulting = asset::checked_add(current, amount, "escrow deposit")?;
        if resulting < threshold {
            return Err(JurisError::NotEnoughFunds {
                needed: threshold,
                available: resulting,
            });
        }

        ctx.tokens
            .transfer_from(&record.token, record.address, from, record.address, amount)?;

        tracing::info!(escrow = %record.address, from = %from, amount, balance = resulting, "Escrow deposit");
        ctx.emit(
            record.address,
            ProtocolEvent::EscrowDeposited {
                escrow: record.address,
                from,
                amount,
                balance: resulting,
            },
        );
        Ok(resulting)
    }

    /// Accept the chain-native asset sent straight to the escrow. Allowed in
    /// every status; a settled escrow's native balance is swept by the safe.
    ///
    /// # Errors
    /// Balance errors from the token ledger.
    pub fn receive_native(
        &self,
        record: &EscrowRecord,
        from: AccountId,
        amount: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<()> {
        ctx.tokens
            .transfer(constants::NATIVE_ASSET, from, record.address, amount)?;
        tracing::debug!(escrow = %record.address, from = %from, amount, "Native asset received");
        ctx.emit(
            record.address,
            ProtocolEvent::NativeReceived {
                escrow: record.address,
                from,
                amount,
            },
        );
        Ok(())
    }

    /// Split the settlement using the internally accrued debt.
    ///
    /// Check order: role, status, holding period, funding.
    ///
    /// # Errors
    /// - `UnAuthorized` unless `caller` is the originator or the safe
    /// - `NotInitialized` / `AlreadySettled` unless ACTIVE
    /// - `HoldingPeriodNotElapsed` until the holding period has strictly passed
    /// - `NotEnoughFunds` below the settlement threshold or when the balance
    ///   cannot cover the accrued claims
    pub fn disburse(
        &self,
        record: &mut EscrowRecord,
        caller: AccountId,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<SettlementSplit> {
        if caller != record.originator && caller != record.safe {
            return Err(JurisError::UnAuthorized {
                caller,
                role: "originator or safe",
            });
        }
        require_active(record)?;
        self.require_holding_elapsed(record, ctx.now)?;
        let settlement = require_funded(record, &*ctx.tokens)?;
        let debt = self.accrued_debt(record, ctx.now)?;
        self.settle(record, settlement, debt, false, ctx)
    }

    /// Split the settlement using a debt supplied by the safe.
    ///
    /// # Errors
    /// - `UnAuthorized` unless `caller` is the safe
    /// - `NotInitialized` / `AlreadySettled` unless ACTIVE
    /// - `HoldingPeriodNotElapsed` until the holding period has strictly passed
    /// - `DebtBelowMinimum` if `debt < principal + markup`
    /// - `NotEnoughFunds` as for [`Self::disburse`]
    pub fn disburse_with_off_chain_apr(
        &self,
        record: &mut EscrowRecord,
        caller: AccountId,
        debt: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<SettlementSplit> {
        if caller != record.safe {
            return Err(JurisError::UnAuthorized {
                caller,
                role: "safe",
            });
        }
        require_active(record)?;
        self.require_holding_elapsed(record, ctx.now)?;
        let minimum = asset::checked_add(record.principal, record.markup, "minimum debt")?;
        if debt < minimum {
            return Err(JurisError::DebtBelowMinimum { debt, minimum });
        }
        let settlement = require_funded(record, &*ctx.tokens)?;
        self.settle(record, settlement, debt, true, ctx)
    }

    /// Sweep the whole balance of `asset` to the safe after settlement.
    /// Returns the amount swept.
    ///
    /// # Errors
    /// - `UnAuthorized` unless `caller` is the safe
    /// - `NotSettled` before settlement
    pub fn withdraw(
        &self,
        record: &EscrowRecord,
        caller: AccountId,
        asset: &str,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<Amount> {
        if caller != record.safe {
            return Err(JurisError::UnAuthorized {
                caller,
                role: "safe",
            });
        }
        if !record.is_settled() {
            return Err(JurisError::NotSettled {
                address: record.address,
                status: record.status,
            });
        }
        let amount = ctx.tokens.balance_of(asset, record.address);
        ctx.tokens
            .transfer(asset, record.address, record.safe, amount)?;

        tracing::info!(escrow = %record.address, asset, amount, "Escrow swept");
        ctx.emit(
            record.address,
            ProtocolEvent::EscrowSwept {
                escrow: record.address,
                asset: asset.to_string(),
                amount,
            },
        );
        Ok(amount)
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// Balance of the escrow token held by the escrow.
    #[must_use]
    pub fn balance(&self, record: &EscrowRecord, tokens: &dyn TokenLedger) -> Amount {
        tokens.balance_of(&record.token, record.address)
    }

    /// `balance >= principal * 10 + markup`.
    ///
    /// # Errors
    /// Returns [`JurisError::ArithmeticOverflow`] for absurd principals.
    pub fn ready(&self, record: &EscrowRecord, tokens: &dyn TokenLedger) -> Result<bool> {
        Ok(self.balance(record, tokens) >= record.settlement_threshold()?)
    }

    /// End of the holding period. Disbursement is allowed strictly after it.
    ///
    /// # Errors
    /// `NotInitialized` before `initialize`.
    pub fn holding_deadline(&self, record: &EscrowRecord) -> Result<DateTime<Utc>> {
        let created_at = record
            .created_at
            .ok_or(JurisError::NotInitialized(record.address))?;
        created_at
            .checked_add_signed(self.holding_period)
            .ok_or(JurisError::ArithmeticOverflow("holding deadline"))
    }

    /// Whether the holding period has strictly passed at `now`.
    ///
    /// # Errors
    /// As [`Self::holding_deadline`].
    pub fn holding_elapsed(&self, record: &EscrowRecord, now: DateTime<Utc>) -> Result<bool> {
        Ok(now > self.holding_deadline(record)?)
    }

    /// Debt accrued on the record's principal up to `now`.
    ///
    /// # Errors
    /// `NotInitialized` before `initialize`, or `ArithmeticOverflow`.
    pub fn accrued_debt(&self, record: &EscrowRecord, now: DateTime<Utc>) -> Result<Amount> {
        let since = record
            .created_at
            .ok_or(JurisError::NotInitialized(record.address))?;
        accrual::accrued_debt(record.principal, record.apr, since, now, self.day_count)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn require_holding_elapsed(&self, record: &EscrowRecord, now: DateTime<Utc>) -> Result<()> {
        let deadline = self.holding_deadline(record)?;
        if now <= deadline {
            return Err(JurisError::HoldingPeriodNotElapsed { ready_at: deadline });
        }
        Ok(())
    }

    fn settle(
        &self,
        record: &mut EscrowRecord,
        settlement: Amount,
        debt: Amount,
        off_chain_debt: bool,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<SettlementSplit> {
        let split = split::compute_split(settlement, debt, record.markup)?;

        for (to, amount) in [
            (record.lawyer, split.lawyer),
            (record.safe, split.safe),
            (record.originator, split.originator),
            (record.plaintiff, split.plaintiff),
        ] {
            ctx.tokens.transfer(&record.token, record.address, to, amount)?;
        }
        record.mark_settled()?;

        tracing::info!(
            escrow = %record.address,
            settlement,
            debt,
            lawyer = split.lawyer,
            safe = split.safe,
            originator = split.originator,
            plaintiff = split.plaintiff,
            off_chain_debt,
            "Escrow settled"
        );
        ctx.emit(
            record.address,
            ProtocolEvent::EscrowSettled {
                escrow: record.address,
                split,
                off_chain_debt,
            },
        );
        Ok(split)
    }
}

fn require_active(record: &EscrowRecord) -> Result<()> {
    match record.status {
        EscrowStatus::Active => Ok(()),
        EscrowStatus::Uninitialized => Err(JurisError::NotInitialized(record.address)),
        EscrowStatus::Settled => Err(JurisError::AlreadySettled(record.address)),
    }
}

/// Current balance, provided it reaches the settlement threshold.
fn require_funded(record: &EscrowRecord, tokens: &dyn TokenLedger) -> Result<Amount> {
    let threshold = record.settlement_threshold()?;
    let balance = tokens.balance_of(&record.token, record.address);
    if balance < threshold {
        return Err(JurisError::NotEnoughFunds {
            needed: threshold,
            available: balance,
        });
    }
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use jurisfund_ledger::{EventLog, TokenBook};

    use super::*;

    const PRINCIPAL: Amount = 10_000 * 1_000_000;
    const MARKUP: Amount = 5_000_000;
    const SETTLEMENT: Amount = PRINCIPAL * 10 + MARKUP;
    const TOKEN: &str = "JUSDC";

    struct Parties {
        originator: AccountId,
        safe: AccountId,
        plaintiff: AccountId,
        lawyer: AccountId,
        payer: AccountId,
    }

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn parties() -> Parties {
        Parties {
            originator: AccountId::derive("originator"),
            safe: AccountId::derive("safe"),
            plaintiff: AccountId::derive("plaintiff"),
            lawyer: AccountId::derive("lawyer"),
            payer: AccountId::derive("defendant"),
        }
    }

    fn implementation() -> EscrowImplementation {
        EscrowImplementation::from_settings(
            AccountId::derive("implementation"),
            &EscrowSettings::default(),
        )
        .unwrap()
    }

    fn init_args(p: &Parties, apr: u32) -> EscrowInit {
        EscrowInit {
            principal: PRINCIPAL,
            apr,
            plaintiff: p.plaintiff,
            lawyer: p.lawyer,
            safe: p.safe,
            token: TOKEN.into(),
        }
    }

    /// Initialized and fully funded escrow at `t0`.
    fn funded(
        imp: &EscrowImplementation,
        p: &Parties,
        tokens: &mut TokenBook,
        events: &mut EventLog,
    ) -> EscrowRecord {
        let mut record = EscrowRecord::uninitialized(AccountId::derive("escrow"));
        let mut ctx = LedgerCtx::new(&mut *tokens, &mut *events, t0());
        imp.initialize(&mut record, p.originator, &init_args(p, 27), &mut ctx)
            .unwrap();
        tokens.mint(TOKEN, p.payer, SETTLEMENT).unwrap();
        tokens.approve(TOKEN, p.payer, record.address, SETTLEMENT);
        let mut ctx = LedgerCtx::new(&mut *tokens, &mut *events, t0());
        imp.deposit(&record, p.payer, SETTLEMENT, &mut ctx).unwrap();
        record
    }

    #[test]
    fn initialize_sets_terms_once() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = EscrowRecord::uninitialized(AccountId::derive("escrow"));

        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0());
        imp.initialize(&mut record, p.originator, &init_args(&p, 27), &mut ctx)
            .unwrap();
        assert_eq!(record.status, EscrowStatus::Active);
        assert_eq!(record.originator, p.originator);
        assert_eq!(record.markup, MARKUP);
        assert_eq!(record.created_at, Some(t0()));

        let mut other = init_args(&p, 3);
        other.principal = 1;
        let err = imp
            .initialize(&mut record, p.safe, &other, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, JurisError::AlreadyInitialized(_)));
        assert_eq!(record.principal, PRINCIPAL);
        assert_eq!(events.count("EscrowInitialized"), 1);
    }

    #[test]
    fn apr_must_be_multiple_of_three() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = EscrowRecord::uninitialized(AccountId::derive("escrow"));
        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0());

        let err = imp
            .initialize(&mut record, p.originator, &init_args(&p, 28), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, JurisError::InvalidApr(28)));
        assert_eq!(record.status, EscrowStatus::Uninitialized);
        assert!(events.is_empty());
    }

    #[test]
    fn deposit_below_threshold_rejected() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = EscrowRecord::uninitialized(AccountId::derive("escrow"));
        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0());
        imp.initialize(&mut record, p.originator, &init_args(&p, 27), &mut ctx)
            .unwrap();

        tokens.mint(TOKEN, p.payer, SETTLEMENT).unwrap();
        tokens.approve(TOKEN, p.payer, record.address, SETTLEMENT);
        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0());
        let err = imp
            .deposit(&record, p.payer, SETTLEMENT - 1, &mut ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            JurisError::NotEnoughFunds {
                needed: SETTLEMENT,
                ..
            }
        ));
        assert!(!imp.ready(&record, &tokens).unwrap());

        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0());
        assert_eq!(
            imp.deposit(&record, p.payer, SETTLEMENT, &mut ctx).unwrap(),
            SETTLEMENT
        );
        assert!(imp.ready(&record, &tokens).unwrap());
        assert_eq!(imp.balance(&record, &tokens), SETTLEMENT);
    }

    #[test]
    fn disburse_waits_for_holding_period() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = funded(&imp, &p, &mut tokens, &mut events);

        let deadline = t0() + TimeDelta::hours(24);
        for now in [t0() + TimeDelta::hours(23), deadline] {
            let mut ctx = LedgerCtx::new(&mut tokens, &mut events, now);
            let err = imp.disburse(&mut record, p.originator, &mut ctx).unwrap_err();
            assert!(matches!(
                err,
                JurisError::HoldingPeriodNotElapsed { ready_at } if ready_at == deadline
            ));
        }
        assert!(record.is_active());
        assert_eq!(imp.balance(&record, &tokens), SETTLEMENT);
    }

    #[test]
    fn disburse_splits_and_settles_once() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = funded(&imp, &p, &mut tokens, &mut events);

        let now = t0() + TimeDelta::hours(25);
        let debt = imp.accrued_debt(&record, now).unwrap();
        assert!(debt > PRINCIPAL);

        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, now);
        let split = imp.disburse(&mut record, p.originator, &mut ctx).unwrap();
        assert_eq!(split.debt, debt);
        assert_eq!(split.total_paid(), SETTLEMENT);
        assert!(record.is_settled());

        assert_eq!(tokens.balance_of(TOKEN, p.lawyer), SETTLEMENT * 30 / 100);
        assert_eq!(tokens.balance_of(TOKEN, p.safe), debt * 3 / 100 + MARKUP);
        assert_eq!(tokens.balance_of(TOKEN, p.originator), debt - debt * 3 / 100);
        assert_eq!(tokens.balance_of(TOKEN, p.plaintiff), split.plaintiff);
        assert_eq!(imp.balance(&record, &tokens), 0);

        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, now);
        let err = imp.disburse(&mut record, p.safe, &mut ctx).unwrap_err();
        assert!(matches!(err, JurisError::AlreadySettled(_)));
        assert_eq!(events.count("EscrowSettled"), 1);
        tokens.verify_supply(TOKEN).unwrap();
    }

    #[test]
    fn disburse_requires_role() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = funded(&imp, &p, &mut tokens, &mut events);

        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0() + TimeDelta::days(2));
        let err = imp.disburse(&mut record, p.plaintiff, &mut ctx).unwrap_err();
        assert!(matches!(err, JurisError::UnAuthorized { .. }));
        assert!(imp.disburse(&mut record, p.safe, &mut ctx).is_ok());
    }

    #[test]
    fn off_chain_debt_rules() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = funded(&imp, &p, &mut tokens, &mut events);
        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0() + TimeDelta::days(2));

        let err = imp
            .disburse_with_off_chain_apr(&mut record, p.originator, 11_407_373_271, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, JurisError::UnAuthorized { role: "safe", .. }));

        let err = imp
            .disburse_with_off_chain_apr(&mut record, p.safe, PRINCIPAL + MARKUP - 1, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, JurisError::DebtBelowMinimum { .. }));

        let split = imp
            .disburse_with_off_chain_apr(&mut record, p.safe, 11_407_373_271, &mut ctx)
            .unwrap();
        assert_eq!(split.debt, 11_407_373_271);
        assert_eq!(
            tokens.balance_of(TOKEN, p.originator),
            11_407_373_271 - 342_221_198
        );
        let last = events.last().unwrap();
        assert!(matches!(
            last.event,
            ProtocolEvent::EscrowSettled {
                off_chain_debt: true,
                ..
            }
        ));
    }

    #[test]
    fn withdraw_only_after_settlement() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = funded(&imp, &p, &mut tokens, &mut events);
        tokens.mint(constants::NATIVE_ASSET, p.payer, 7).unwrap();

        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0() + TimeDelta::days(2));
        imp.receive_native(&record, p.payer, 7, &mut ctx).unwrap();

        let err = imp
            .withdraw(&record, p.safe, constants::NATIVE_ASSET, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, JurisError::NotSettled { .. }));

        imp.disburse(&mut record, p.safe, &mut ctx).unwrap();
        let err = imp
            .withdraw(&record, p.lawyer, constants::NATIVE_ASSET, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, JurisError::UnAuthorized { .. }));

        assert_eq!(
            imp.withdraw(&record, p.safe, constants::NATIVE_ASSET, &mut ctx)
                .unwrap(),
            7
        );
        assert_eq!(tokens.balance_of(constants::NATIVE_ASSET, p.safe), 7);
        assert_eq!(events.count("EscrowSwept"), 1);
        assert_eq!(events.count("NativeReceived"), 1);
    }

    #[test]
    fn deposit_into_settled_escrow_rejected() {
        let imp = implementation();
        let p = parties();
        let mut tokens = TokenBook::new();
        let mut events = EventLog::new();
        let mut record = funded(&imp, &p, &mut tokens, &mut events);
        let mut ctx = LedgerCtx::new(&mut tokens, &mut events, t0() + TimeDelta::days(2));
        imp.disburse(&mut record, p.originator, &mut ctx).unwrap();

        let err = imp
            .deposit(&record, p.payer, SETTLEMENT, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, JurisError::AlreadySettled(_)));
    }
}
