//! Staking pool records: individual stakes, pool totals and pool config.
//!
//! Pool totals are the sums over all non-finished stakes:
//! ```text
//! staked_amount == Σ stake.amount    (stake.finished == false)
//! liquidity     == Σ stake.liquidity (stake.finished == false)
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, Asset, StakeKey, constants};

/// How liquidity credit is issued for a new stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StakeMode {
    /// One liquidity credit per staked unit.
    Fixed,
    /// Credit issued at the pool's current liquidity/staked rate
    /// (1:1 while the pool is empty).
    RateBased,
}

impl From<bool> for StakeMode {
    fn from(mode: bool) -> Self {
        if mode { Self::RateBased } else { Self::Fixed }
    }
}

/// A single staking position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub key: StakeKey,
    pub owner: AccountId,
    pub mode: StakeMode,
    /// Tokens deposited.
    pub amount: Amount,
    /// Liquidity credit issued.
    pub liquidity: Amount,
    pub staked_at: DateTime<Utc>,
    pub unlock_time: DateTime<Utc>,
    /// Flips to `true` exactly once, on unstake.
    pub finished: bool,
}

impl Stake {
    /// Whether the lock has expired at `now`.
    #[must_use]
    pub fn is_unlocked(&self, now: DateTime<Utc>) -> bool {
        now >= self.unlock_time
    }
}

/// Pool-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub staked_amount: Amount,
    pub liquidity: Amount,
}

impl PoolState {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staked_amount == 0 && self.liquidity == 0
    }

    /// Liquidity credit per staked unit. One while the pool is empty;
    /// `None` if a total leaves the decimal range.
    #[must_use]
    pub fn exchange_rate(&self) -> Option<Decimal> {
        if self.staked_amount == 0 {
            return Some(Decimal::ONE);
        }
        let liquidity = Decimal::from_u128(self.liquidity)?;
        let staked = Decimal::from_u128(self.staked_amount)?;
        liquidity.checked_div(staked)
    }
}

/// Static pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Token accepted for staking.
    pub token: Asset,
    pub min_stake_amount: Amount,
    /// Lock duration applied to every stake.
    pub full_period: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            token: constants::DEFAULT_TOKEN.to_string(),
            min_stake_amount: constants::DEFAULT_MIN_STAKE_AMOUNT,
            full_period: Duration::from_secs(constants::DEFAULT_FULL_PERIOD_SECS),
        }
    }
}

/// Metadata of the liquidity credit token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityTokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for LiquidityTokenInfo {
    fn default() -> Self {
        Self {
            name: constants::LIQUIDITY_TOKEN_NAME.to_string(),
            symbol: constants::LIQUIDITY_TOKEN_SYMBOL.to_string(),
            decimals: constants::LIQUIDITY_TOKEN_DECIMALS,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn mode_from_flag() {
        assert_eq!(StakeMode::from(false), StakeMode::Fixed);
        assert_eq!(StakeMode::from(true), StakeMode::RateBased);
    }

    #[test]
    fn unlock_boundary_is_inclusive() {
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let unlock = t0 + chrono::TimeDelta::seconds(10);
        let stake = Stake {
            key: StakeKey([1; 32]),
            owner: AccountId::derive("owner"),
            mode: StakeMode::Fixed,
            amount: 1,
            liquidity: 1,
            staked_at: t0,
            unlock_time: unlock,
            finished: false,
        };
        assert!(!stake.is_unlocked(t0));
        assert!(stake.is_unlocked(unlock));
    }

    #[test]
    fn exchange_rate() {
        assert_eq!(PoolState::default().exchange_rate(), Some(Decimal::ONE));
        let state = PoolState {
            staked_amount: 20_000_000,
            liquidity: 10_000_000,
        };
        assert_eq!(state.exchange_rate(), Some(Decimal::new(5, 1)));
        let huge = PoolState {
            staked_amount: 1,
            liquidity: u128::MAX,
        };
        assert_eq!(huge.exchange_rate(), None);
    }

    #[test]
    fn liquidity_token_metadata() {
        let info = LiquidityTokenInfo::default();
        assert_eq!(info.name, "Juris Pool Liquidity");
        assert_eq!(info.symbol, "JPL");
        assert_eq!(info.decimals, 18);
    }

    #[test]
    fn pool_config_serde_roundtrip() {
        let cfg = PoolConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: PoolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
