//! Protocol configuration.
//!
//! Loaded from JSON (every field optional, falling back to the defaults in
//! [`constants`](crate::constants)) and validated once at startup.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    AccountId, Amount, Asset, JurisError, LiquidityTokenInfo, PoolConfig, Result, TellerConfig,
    constants,
};

/// Day-count convention for the internally computed escrow debt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCount {
    /// Elapsed seconds over a 365-day year.
    #[default]
    Actual365,
    /// Elapsed seconds over a 360-day year.
    Actual360,
}

impl DayCount {
    /// Days in the accrual year.
    #[must_use]
    pub fn days_per_year(self) -> i64 {
        match self {
            Self::Actual365 => constants::DAYS_PER_YEAR,
            Self::Actual360 => 360,
        }
    }
}

/// Top-level configuration of one protocol instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Privileged settlement / treasury authority.
    pub safe: AccountId,
    /// Settlement and staking token.
    pub token: Asset,
    pub escrow: EscrowSettings,
    pub pool: PoolSettings,
    pub teller: TellerSettings,
}

/// Escrow implementation and registry scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowSettings {
    /// Fixed markup charged per case.
    pub markup: Amount,
    /// Minimum time between `initialize` and disbursement.
    pub holding_period: Duration,
    /// Minimum time between two upkeep runs.
    pub upkeep_interval: Duration,
    /// Maximum escrows settled per upkeep run.
    pub upkeep_batch_limit: usize,
    pub day_count: DayCount,
}

impl Default for EscrowSettings {
    fn default() -> Self {
        Self {
            markup: constants::DEFAULT_MARKUP,
            holding_period: Duration::from_secs(constants::DEFAULT_HOLDING_PERIOD_SECS),
            upkeep_interval: Duration::from_secs(constants::DEFAULT_UPKEEP_INTERVAL_SECS),
            upkeep_batch_limit: constants::DEFAULT_UPKEEP_BATCH_LIMIT,
            day_count: DayCount::default(),
        }
    }
}

/// Staking pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub min_stake_amount: Amount,
    pub full_period: Duration,
    pub liquidity_token: LiquidityTokenInfo,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_stake_amount: constants::DEFAULT_MIN_STAKE_AMOUNT,
            full_period: Duration::from_secs(constants::DEFAULT_FULL_PERIOD_SECS),
            liquidity_token: LiquidityTokenInfo::default(),
        }
    }
}

/// Initial treasury teller limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TellerSettings {
    pub withdrawal_delay: Duration,
    pub max_single_withdrawal: Amount,
}

impl Default for TellerSettings {
    fn default() -> Self {
        Self {
            withdrawal_delay: Duration::from_secs(constants::DEFAULT_WITHDRAWAL_DELAY_SECS),
            max_single_withdrawal: constants::DEFAULT_MAX_SINGLE_WITHDRAWAL,
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            safe: AccountId::derive("jurisfund:safe"),
            token: constants::DEFAULT_TOKEN.to_string(),
            escrow: EscrowSettings::default(),
            pool: PoolSettings::default(),
            teller: TellerSettings::default(),
        }
    }
}

impl ProtocolConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    /// Returns [`JurisError::Serialization`] on malformed JSON and
    /// [`JurisError::Configuration`] on out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    /// As [`Self::from_json_str`], plus [`JurisError::Io`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject configurations the protocol cannot run with.
    ///
    /// # Errors
    /// Returns [`JurisError::Configuration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.safe.is_zero() {
            return Err(JurisError::Configuration("safe must be non-zero".into()));
        }
        if self.token.is_empty() {
            return Err(JurisError::Configuration("token must be set".into()));
        }
        if self.escrow.upkeep_interval.is_zero() {
            return Err(JurisError::Configuration(
                "escrow.upkeep_interval must be > 0".into(),
            ));
        }
        if self.escrow.upkeep_batch_limit == 0 {
            return Err(JurisError::Configuration(
                "escrow.upkeep_batch_limit must be > 0".into(),
            ));
        }
        if self.pool.min_stake_amount == 0 {
            return Err(JurisError::Configuration(
                "pool.min_stake_amount must be > 0".into(),
            ));
        }
        if self.teller.max_single_withdrawal == 0 {
            return Err(JurisError::Configuration(
                "teller.max_single_withdrawal must be > 0".into(),
            ));
        }
        for (name, d) in [
            ("escrow.holding_period", self.escrow.holding_period),
            ("escrow.upkeep_interval", self.escrow.upkeep_interval),
            ("pool.full_period", self.pool.full_period),
            ("teller.withdrawal_delay", self.teller.withdrawal_delay),
        ] {
            crate::time::to_delta(d)
                .map_err(|_| JurisError::Configuration(format!("{name} out of range")))?;
        }
        Ok(())
    }

    /// Pool configuration derived from this config.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            token: self.token.clone(),
            min_stake_amount: self.pool.min_stake_amount,
            full_period: self.pool.full_period,
        }
    }

    /// Initial teller configuration (no action taken yet).
    #[must_use]
    pub fn teller_config(&self) -> TellerConfig {
        TellerConfig {
            withdrawal_delay: self.teller.withdrawal_delay,
            max_single_withdrawal: self.teller.max_single_withdrawal,
            last_action_at: None,
        }
    }
}
