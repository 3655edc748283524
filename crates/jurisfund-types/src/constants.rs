//! System-wide constants for the JurisFund protocol.

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Day-count basis for APR accrual (Actual/365).
pub const DAYS_PER_YEAR: i64 = 365;

/// APR values must be a multiple of this step.
pub const APR_STEP: u32 = 3;

/// Settlement threshold is `principal * SETTLEMENT_MULTIPLIER + markup`.
pub const SETTLEMENT_MULTIPLIER: u128 = 10;

/// Share of the full settlement paid to the plaintiff's lawyer, in percent.
pub const LAWYER_SHARE_PERCENT: u128 = 30;

/// Share of the debt paid to the safe on top of the markup, in percent.
pub const SAFE_DEBT_SHARE_PERCENT: u128 = 3;

/// Denominator for all percentage shares.
pub const PERCENT_DENOMINATOR: u128 = 100;

/// Default fixed markup charged per case (5 units of a 6-decimal token).
pub const DEFAULT_MARKUP: u128 = 5_000_000;

/// Default minimum holding period before an escrow can be disbursed.
pub const DEFAULT_HOLDING_PERIOD_SECS: u64 = 24 * 60 * 60;

/// Default interval between two upkeep runs.
pub const DEFAULT_UPKEEP_INTERVAL_SECS: u64 = 4 * 60 * 60;

/// Maximum escrows settled in a single upkeep run.
pub const DEFAULT_UPKEEP_BATCH_LIMIT: usize = 64;

/// Default minimum stake (10 units of a 6-decimal token).
pub const DEFAULT_MIN_STAKE_AMOUNT: u128 = 10_000_000;

/// Default stake lock period: two years.
pub const DEFAULT_FULL_PERIOD_SECS: u64 = 2 * 365 * 24 * 60 * 60;

/// Default teller cooldown between privileged actions.
pub const DEFAULT_WITHDRAWAL_DELAY_SECS: u64 = 60 * 60;

/// Default ceiling for a single teller dispense.
pub const DEFAULT_MAX_SINGLE_WITHDRAWAL: u128 = 10_000 * 1_000_000;

/// Default settlement token symbol.
pub const DEFAULT_TOKEN: &str = "JUSDC";

/// Chain-native asset received outside of token deposits.
pub const NATIVE_ASSET: &str = "ETH";

/// Liquidity credit token name.
pub const LIQUIDITY_TOKEN_NAME: &str = "Juris Pool Liquidity";

/// Liquidity credit token symbol.
pub const LIQUIDITY_TOKEN_SYMBOL: &str = "JPL";

/// Liquidity credit token decimals.
pub const LIQUIDITY_TOKEN_DECIMALS: u8 = 18;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name.
pub const PROTOCOL_NAME: &str = "JurisFund";
