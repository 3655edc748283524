//! Liquidity staking pool.
//!
//! Stakers deposit the pool token, receive liquidity credit and may withdraw
//! their deposit once the full lock period has passed. Deposits are held by
//! the custody account (the protocol treasury), which is also where the
//! teller dispenses from.
//!
//! Pool totals always equal the sums over all open stakes:
//! ```text
//! staked_amount == Σ amount    (not finished)
//! liquidity     == Σ liquidity (not finished)
//! ```

use std::collections::HashMap;

use chrono::TimeDelta;
use jurisfund_ledger::LedgerCtx;
use jurisfund_types::{
    AccountId, Amount, JurisError, LiquidityTokenInfo, PoolConfig, PoolState, ProtocolEvent,
    Result, Stake, StakeKey, StakeMode, asset, time,
};

/// The staking pool.
#[derive(Debug, Clone)]
pub struct StakingPool {
    /// Account holding staked tokens.
    custody: AccountId,
    config: PoolConfig,
    full_period: TimeDelta,
    liquidity_token: LiquidityTokenInfo,
    state: PoolState,
    stakes: HashMap<StakeKey, Stake>,
    by_owner: HashMap<AccountId, Vec<StakeKey>>,
    /// Never repeats; feeds stake key derivation.
    nonce: u64,
}

impl StakingPool {
    /// Create an empty pool.
    ///
    /// # Errors
    /// Returns [`JurisError::Configuration`] if the lock period is out of range.
    pub fn new(
        custody: AccountId,
        config: PoolConfig,
        liquidity_token: LiquidityTokenInfo,
    ) -> Result<Self> {
        let full_period = time::to_delta(config.full_period)?;
        Ok(Self {
            custody,
            config,
            full_period,
            liquidity_token,
            state: PoolState::default(),
            stakes: HashMap::new(),
            by_owner: HashMap::new(),
            nonce: 0,
        })
    }

    #[must_use]
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Stake `amount` of the pool token from `caller` (who must have approved
    /// the custody account). `mode` picks fixed or rate-based credit.
    ///
    /// # Errors
    /// - `InvalidStakeAmount` below the pool minimum or if no credit results
    /// - allowance or balance errors from the token ledger
    pub fn stake(
        &mut self,
        caller: AccountId,
        mode: bool,
        amount: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<StakeKey> {
        let minimum = self.config.min_stake_amount;
        if amount < minimum {
            return Err(JurisError::InvalidStakeAmount { amount, minimum });
        }
        let mode = StakeMode::from(mode);
        let liquidity = self.liquidity_for(mode, amount)?;
        if liquidity == 0 {
            return Err(JurisError::InvalidStakeAmount { amount, minimum });
        }
        let next_state = PoolState {
            staked_amount: asset::checked_add(self.state.staked_amount, amount, "pool stake")?,
            liquidity: asset::checked_add(self.state.liquidity, liquidity, "pool liquidity")?,
        };
        let unlock_time = ctx
            .now
            .checked_add_signed(self.full_period)
            .ok_or(JurisError::ArithmeticOverflow("stake unlock time"))?;

        ctx.tokens
            .transfer_from(&self.config.token, self.custody, caller, self.custody, amount)?;

        let key = StakeKey::derive(caller, self.nonce, ctx.now);
        self.nonce += 1;
        self.stakes.insert(
            key,
            Stake {
                key,
                owner: caller,
                mode,
                amount,
                liquidity,
                staked_at: ctx.now,
                unlock_time,
                finished: false,
            },
        );
        self.by_owner.entry(caller).or_default().push(key);
        self.state = next_state;

        tracing::info!(
            stake = %key,
            owner = %caller,
            amount,
            liquidity,
            ?mode,
            unlock_time = %unlock_time,
            rate = ?self.state.exchange_rate(),
            "Stake opened"
        );
        ctx.emit(
            self.custody,
            ProtocolEvent::Staked {
                key,
                owner: caller,
                amount,
                liquidity,
                unlock_time,
            },
        );
        ctx.emit(self.custody, ProtocolEvent::PoolRateUpdated { state: self.state });
        Ok(key)
    }

    /// Withdraw a stake back to its owner. Returns the amount paid out.
    ///
    /// # Errors
    /// - `StakeNotFound` for an unknown key
    /// - `Forbidden` unless `caller` owns the stake
    /// - `Locked` before the unlock time
    /// - `StakeAlreadyFinished` on a second withdrawal
    /// - balance errors if custody no longer holds the deposit
    pub fn un_stake(
        &mut self,
        caller: AccountId,
        key: StakeKey,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<Amount> {
        let stake = self.stakes.get(&key).ok_or(JurisError::StakeNotFound(key))?;
        if stake.owner != caller {
            return Err(JurisError::Forbidden { caller, key });
        }
        if !stake.is_unlocked(ctx.now) {
            return Err(JurisError::Locked {
                key,
                unlock_time: stake.unlock_time,
            });
        }
        if stake.finished {
            return Err(JurisError::StakeAlreadyFinished(key));
        }
        let (amount, liquidity) = (stake.amount, stake.liquidity);
        let next_state = PoolState {
            staked_amount: self.state.staked_amount.checked_sub(amount).ok_or_else(|| {
                JurisError::SupplyInvariantViolation {
                    reason: format!("pool staked total below stake {key}"),
                }
            })?,
            liquidity: self.state.liquidity.checked_sub(liquidity).ok_or_else(|| {
                JurisError::SupplyInvariantViolation {
                    reason: format!("pool liquidity below stake {key}"),
                }
            })?,
        };

        ctx.tokens
            .transfer(&self.config.token, self.custody, caller, amount)?;

        if let Some(stake) = self.stakes.get_mut(&key) {
            stake.finished = true;
        }
        self.state = next_state;

        tracing::info!(
            stake = %key,
            owner = %caller,
            amount,
            liquidity,
            rate = ?self.state.exchange_rate(),
            "Stake withdrawn"
        );
        ctx.emit(
            self.custody,
            ProtocolEvent::Unstaked {
                key,
                owner: caller,
                amount,
                liquidity,
            },
        );
        ctx.emit(self.custody, ProtocolEvent::PoolRateUpdated { state: self.state });
        Ok(amount)
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// # Errors
    /// `StakeNotFound` for an unknown key.
    pub fn get_stake(&self, key: StakeKey) -> Result<&Stake> {
        self.stakes.get(&key).ok_or(JurisError::StakeNotFound(key))
    }

    #[must_use]
    pub fn get_pool_state(&self) -> PoolState {
        self.state
    }

    #[must_use]
    pub fn get_pool_config(&self) -> &PoolConfig {
        &self.config
    }

    #[must_use]
    pub fn liquidity_token(&self) -> &LiquidityTokenInfo {
        &self.liquidity_token
    }

    /// Stakes of `owner`, oldest first, finished ones included.
    #[must_use]
    pub fn stakes_of(&self, owner: AccountId) -> Vec<&Stake> {
        self.by_owner
            .get(&owner)
            .map(|keys| keys.iter().filter_map(|k| self.stakes.get(k)).collect())
            .unwrap_or_default()
    }

    /// Check the pool totals against the open stakes.
    ///
    /// # Errors
    /// Returns [`JurisError::SupplyInvariantViolation`] on mismatch.
    pub fn verify_totals(&self) -> Result<()> {
        let open = self.stakes.values().filter(|s| !s.finished);
        let (staked, liquidity) = open.fold((0u128, 0u128), |(a, l), s| {
            (a.saturating_add(s.amount), l.saturating_add(s.liquidity))
        });
        if staked != self.state.staked_amount || liquidity != self.state.liquidity {
            tracing::error!(
                staked,
                liquidity,
                pool_staked = self.state.staked_amount,
                pool_liquidity = self.state.liquidity,
                "Pool totals diverged from open stakes"
            );
            return Err(JurisError::SupplyInvariantViolation {
                reason: format!(
                    "open stakes sum to ({staked}, {liquidity}), pool reports ({}, {})",
                    self.state.staked_amount, self.state.liquidity
                ),
            });
        }
        Ok(())
    }

    /// Liquidity credit for a new stake of `amount`.
    fn liquidity_for(&self, mode: StakeMode, amount: Amount) -> Result<Amount> {
        match mode {
            StakeMode::Fixed => Ok(amount),
            StakeMode::RateBased if self.state.staked_amount == 0 => Ok(amount),
            StakeMode::RateBased => Ok(asset::checked_mul(
                amount,
                self.state.liquidity,
                "rate-based liquidity",
            )? / self.state.staked_amount),
        }
    }
}
