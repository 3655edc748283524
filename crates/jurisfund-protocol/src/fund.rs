//! # JurisFund facade
//!
//! Composes the escrow registry, the staking pool and the treasury teller
//! over one world state (clock, token book, event journal).
//!
//! ## Accounts
//!
//! The registry identity doubles as the **treasury account**: it is the
//! originator of every escrow (and so receives originator shares), it holds
//! staked deposits, and the teller dispenses from it.
//!
//! ## Atomicity
//!
//! Every mutating call runs inside [`JurisFund::transact`]: module state is
//! snapshotted first and restored on error, and the journal is cut back to
//! its previous length. A failed call leaves no trace.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jurisfund_escrow::{EscrowRegistry, RegistryEntry, UpkeepCheck, UpkeepReport};
use jurisfund_ledger::{EventLog, LedgerClock, LedgerCtx, TokenBook, TokenLedger};
use jurisfund_types::{
    AccountId, Amount, EscrowData, EscrowInit, LiquidityTokenInfo, PoolConfig, PoolState,
    ProtocolConfig, Result, Salt, SettlementSplit, Stake, StakeKey, TellerConfig,
};
use jurisfund_treasury::{StakingPool, Teller};

/// Label of the registry / treasury identity.
pub const REGISTRY_LABEL: &str = "jurisfund:registry";

/// Label of the shared escrow implementation identity.
pub const IMPLEMENTATION_LABEL: &str = "jurisfund:escrow-implementation";

/// Module state restored by a failed transaction.
#[derive(Debug, Clone)]
struct Modules {
    tokens: TokenBook,
    registry: EscrowRegistry,
    pool: StakingPool,
    teller: Teller,
}

/// What a transaction body may touch.
struct Scope<'a> {
    ctx: LedgerCtx<'a>,
    registry: &'a mut EscrowRegistry,
    pool: &'a mut StakingPool,
    teller: &'a mut Teller,
}

/// One protocol instance.
#[derive(Debug, Clone)]
pub struct JurisFund {
    config: ProtocolConfig,
    clock: LedgerClock,
    events: EventLog,
    modules: Modules,
}

impl JurisFund {
    /// Start a protocol instance with the ledger clock at wall time.
    ///
    /// # Errors
    /// Returns [`jurisfund_types::JurisError::Configuration`] for an invalid config.
    pub fn new(config: ProtocolConfig) -> Result<Self> {
        Self::with_start(config, Utc::now())
    }

    /// Start a protocol instance with the ledger clock at `start`.
    ///
    /// # Errors
    /// Returns [`jurisfund_types::JurisError::Configuration`] for an invalid config.
    pub fn with_start(config: ProtocolConfig, start: DateTime<Utc>) -> Result<Self> {
        config.validate()?;
        let treasury = AccountId::derive(REGISTRY_LABEL);
        let registry = EscrowRegistry::from_settings(
            treasury,
            AccountId::derive(IMPLEMENTATION_LABEL),
            &config.escrow,
            start,
        )?;
        let pool = StakingPool::new(
            treasury,
            config.pool_config(),
            config.pool.liquidity_token.clone(),
        )?;
        let teller = Teller::new(treasury, config.safe, &config.teller_config())?;

        tracing::info!(
            treasury = %treasury,
            safe = %config.safe,
            token = %config.token,
            start = %start,
            "JurisFund started"
        );
        Ok(Self {
            config,
            clock: LedgerClock::new(start),
            events: EventLog::new(),
            modules: Modules {
                tokens: TokenBook::new(),
                registry,
                pool,
                teller,
            },
        })
    }

    /// Run `body` all-or-nothing.
    fn transact<T>(
        &mut self,
        op: &'static str,
        body: impl FnOnce(&mut Scope<'_>) -> Result<T>,
    ) -> Result<T> {
        // Whole-state copy: each mutating call costs O(state).
        let snapshot = self.modules.clone();
        let journal_len = self.events.len();
        let now = self.clock.now();

        let Modules {
            tokens,
            registry,
            pool,
            teller,
        } = &mut self.modules;
        let result = body(&mut Scope {
            ctx: LedgerCtx::new(tokens, &mut self.events, now),
            registry,
            pool,
            teller,
        });

        if let Err(err) = &result {
            tracing::warn!(op, error = %err, "Transaction reverted");
            self.modules = snapshot;
            self.events.truncate(journal_len);
        }
        result
    }

    // -----------------------------------------------------------------
    // World state
    // -----------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// # Errors
    /// `ClockRegression` for a negative delta.
    pub fn advance_time(&mut self, delta: TimeDelta) -> Result<DateTime<Utc>> {
        self.clock.advance(delta)
    }

    /// # Errors
    /// `ClockRegression` if `target` is in the past.
    pub fn advance_time_to(&mut self, target: DateTime<Utc>) -> Result<DateTime<Utc>> {
        self.clock.advance_to(target)
    }

    /// The registry identity, which is also the treasury account.
    #[must_use]
    pub fn treasury(&self) -> AccountId {
        self.modules.registry.id()
    }

    #[must_use]
    pub fn safe(&self) -> AccountId {
        self.config.safe
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenBook {
        &self.modules.tokens
    }

    #[must_use]
    pub fn balance_of(&self, asset: &str, holder: AccountId) -> Amount {
        self.modules.tokens.balance_of(asset, holder)
    }

    /// Create `amount` of `asset` for `to`. Funding hook for the token
    /// collaborator; not part of the protocol's own authority model.
    ///
    /// # Errors
    /// `ArithmeticOverflow` if supply would overflow.
    pub fn mint(&mut self, asset: &str, to: AccountId, amount: Amount) -> Result<()> {
        self.modules.tokens.mint(asset, to, amount)
    }

    pub fn approve(&mut self, asset: &str, owner: AccountId, spender: AccountId, amount: Amount) {
        self.modules.tokens.approve(asset, owner, spender, amount);
    }

    /// Plain token transfer between two holders. Sending the escrow token to
    /// an escrow address this way is observed in its balance.
    ///
    /// # Errors
    /// `InsufficientBalance`.
    pub fn transfer(
        &mut self,
        asset: &str,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.modules.tokens.transfer(asset, from, to, amount)
    }

    // -----------------------------------------------------------------
    // Escrow registry
    // -----------------------------------------------------------------

    #[must_use]
    pub fn pre_calculate_escrow_address(&self, salt: &Salt) -> AccountId {
        self.modules.registry.pre_calculate_escrow_address(salt)
    }

    /// # Errors
    /// See [`EscrowRegistry::deploy_escrow`].
    pub fn deploy_escrow(&mut self, init: &EscrowInit, salt: Salt) -> Result<AccountId> {
        self.transact("deploy_escrow", |s| {
            s.registry.deploy_escrow(init, salt, &mut s.ctx)
        })
    }

    /// # Errors
    /// See [`EscrowRegistry::deposit`].
    pub fn deposit(&mut self, escrow: AccountId, from: AccountId, amount: Amount) -> Result<Amount> {
        self.transact("deposit", |s| {
            s.registry.deposit(escrow, from, amount, &mut s.ctx)
        })
    }

    /// # Errors
    /// See [`EscrowRegistry::receive_native`].
    pub fn receive_native(&mut self, escrow: AccountId, from: AccountId, amount: Amount) -> Result<()> {
        self.transact("receive_native", |s| {
            s.registry.receive_native(escrow, from, amount, &mut s.ctx)
        })
    }

    /// # Errors
    /// See [`EscrowRegistry::disburse`].
    pub fn disburse(&mut self, escrow: AccountId, caller: AccountId) -> Result<SettlementSplit> {
        self.transact("disburse", |s| {
            s.registry.disburse(escrow, caller, &mut s.ctx)
        })
    }

    /// # Errors
    /// See [`EscrowRegistry::disburse_with_off_chain_apr`].
    pub fn disburse_with_off_chain_apr(
        &mut self,
        escrow: AccountId,
        caller: AccountId,
        debt: Amount,
    ) -> Result<SettlementSplit> {
        self.transact("disburse_with_off_chain_apr", |s| {
            s.registry
                .disburse_with_off_chain_apr(escrow, caller, debt, &mut s.ctx)
        })
    }

    /// Sweep residual `asset` from a settled escrow to its safe.
    ///
    /// # Errors
    /// See [`EscrowRegistry::withdraw`].
    pub fn withdraw_from_escrow(
        &mut self,
        escrow: AccountId,
        caller: AccountId,
        asset: &str,
    ) -> Result<Amount> {
        self.transact("withdraw_from_escrow", |s| {
            s.registry.withdraw(escrow, caller, asset, &mut s.ctx)
        })
    }

    /// # Errors
    /// `EscrowNotFound`.
    pub fn is_settled(&self, escrow: AccountId) -> Result<bool> {
        self.modules.registry.is_settled(escrow)
    }

    /// # Errors
    /// `EscrowNotFound`.
    pub fn ready(&self, escrow: AccountId) -> Result<bool> {
        self.modules.registry.ready(escrow, &self.modules.tokens)
    }

    /// # Errors
    /// `EscrowNotFound`.
    pub fn get_balance(&self, escrow: AccountId) -> Result<Amount> {
        self.modules.registry.balance(escrow, &self.modules.tokens)
    }

    /// # Errors
    /// `EscrowNotFound`.
    pub fn get_escrow_data(&self, escrow: AccountId) -> Result<EscrowData> {
        self.modules.registry.escrow_data(escrow)
    }

    #[must_use]
    pub fn registry_entry(&self, escrow: AccountId) -> Option<RegistryEntry> {
        self.modules.registry.entry(escrow)
    }

    /// Addresses of all deployed escrows, in deployment order.
    #[must_use]
    pub fn escrows(&self) -> Vec<AccountId> {
        self.modules.registry.escrows().map(|r| r.address).collect()
    }

    /// # Errors
    /// `ArithmeticOverflow` for absurd principals.
    pub fn check_upkeep(&self) -> Result<UpkeepCheck> {
        self.modules
            .registry
            .check_upkeep(&self.modules.tokens, self.clock.now())
    }

    /// # Errors
    /// `UpkeepNotNeeded` when nothing is due.
    pub fn perform_upkeep(&mut self) -> Result<UpkeepReport> {
        self.transact("perform_upkeep", |s| s.registry.perform_upkeep(&mut s.ctx))
    }

    // -----------------------------------------------------------------
    // Staking pool
    // -----------------------------------------------------------------

    /// # Errors
    /// See [`StakingPool::stake`].
    pub fn stake(&mut self, caller: AccountId, mode: bool, amount: Amount) -> Result<StakeKey> {
        self.transact("stake", |s| s.pool.stake(caller, mode, amount, &mut s.ctx))
    }

    /// # Errors
    /// See [`StakingPool::un_stake`].
    pub fn un_stake(&mut self, caller: AccountId, key: StakeKey) -> Result<Amount> {
        self.transact("un_stake", |s| s.pool.un_stake(caller, key, &mut s.ctx))
    }

    /// # Errors
    /// `StakeNotFound`.
    pub fn get_stake(&self, key: StakeKey) -> Result<&Stake> {
        self.modules.pool.get_stake(key)
    }

    #[must_use]
    pub fn get_pool_state(&self) -> PoolState {
        self.modules.pool.get_pool_state()
    }

    #[must_use]
    pub fn get_pool_config(&self) -> &PoolConfig {
        self.modules.pool.get_pool_config()
    }

    #[must_use]
    pub fn stakes_of(&self, owner: AccountId) -> Vec<&Stake> {
        self.modules.pool.stakes_of(owner)
    }

    #[must_use]
    pub fn liquidity_token(&self) -> &LiquidityTokenInfo {
        self.modules.pool.liquidity_token()
    }

    // -----------------------------------------------------------------
    // Treasury teller
    // -----------------------------------------------------------------

    /// # Errors
    /// See [`Teller::dispense`].
    pub fn dispense(
        &mut self,
        caller: AccountId,
        asset: &str,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.transact("dispense", |s| {
            s.teller.dispense(caller, asset, to, amount, &mut s.ctx)
        })
    }

    /// # Errors
    /// See [`Teller::update_teller_config`].
    pub fn update_teller_config(
        &mut self,
        caller: AccountId,
        withdrawal_delay: Duration,
        max_single_withdrawal: Amount,
    ) -> Result<()> {
        self.transact("update_teller_config", |s| {
            s.teller
                .update_teller_config(caller, withdrawal_delay, max_single_withdrawal, &mut s.ctx)
        })
    }

    #[must_use]
    pub fn teller_config(&self) -> TellerConfig {
        self.modules.teller.config()
    }

    // -----------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------

    /// Check token conservation for `asset` and the pool totals.
    ///
    /// # Errors
    /// `SupplyInvariantViolation`.
    pub fn verify_invariants(&self, asset: &str) -> Result<()> {
        self.modules.tokens.verify_supply(asset)?;
        self.modules.pool.verify_totals()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use jurisfund_types::JurisError;

    use super::*;

    fn fund() -> JurisFund {
        JurisFund::with_start(
            ProtocolConfig::default(),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = ProtocolConfig::default();
        config.teller.max_single_withdrawal = 0;
        assert!(matches!(
            JurisFund::new(config).unwrap_err(),
            JurisError::Configuration(_)
        ));
    }

    #[test]
    fn failed_call_leaves_no_event() {
        let mut fund = fund();
        let stranger = AccountId::derive("stranger");
        let before = fund.events().len();
        let err = fund
            .dispense(stranger, "JUSDC", stranger, 1)
            .unwrap_err();
        assert!(matches!(err, JurisError::UnAuthorized { .. }));
        assert_eq!(fund.events().len(), before);
    }

    #[test]
    fn treasury_is_pool_custody() {
        let fund = fund();
        assert_eq!(fund.treasury(), AccountId::derive(REGISTRY_LABEL));
        assert_eq!(fund.liquidity_token().symbol, "JPL");
    }
}
