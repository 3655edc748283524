//! Error types for the JurisFund protocol.
//!
//! All errors use the `JF_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by failure class:
//! - 1xx: Authorization errors (caller lacks the required role)
//! - 2xx: State errors (operation invalid for the current lifecycle stage)
//! - 3xx: Validation errors (malformed or out-of-range arguments)
//! - 4xx: Insufficiency errors (balance or funding below a threshold)
//! - 5xx: Rate-limit errors (cooldown not elapsed, ceiling exceeded)
//! - 9xx: General / internal errors
//!
//! Every error is fail-fast: the operation that produced it has not
//! mutated any state.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{AccountId, Amount, EscrowStatus, StakeKey};

/// Broad failure class of a [`JurisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authorization,
    State,
    Validation,
    Insufficiency,
    RateLimit,
    Internal,
}

/// Central error enum for all JurisFund operations.
#[derive(Debug, Error)]
pub enum JurisError {
    // =================================================================
    // Authorization (1xx)
    // =================================================================
    /// The caller does not hold the privileged role required.
    #[error("JF_ERR_100: Unauthorized: {caller} is not {role}")]
    UnAuthorized { caller: AccountId, role: &'static str },

    /// The caller does not own the record it tried to act on.
    #[error("JF_ERR_101: Forbidden: {caller} does not own {key}")]
    Forbidden { caller: AccountId, key: StakeKey },

    // =================================================================
    // State (2xx)
    // =================================================================
    /// `initialize` was called on an escrow that has left `Uninitialized`.
    #[error("JF_ERR_200: Escrow {0} already initialized")]
    AlreadyInitialized(AccountId),

    /// The escrow has not been initialized yet.
    #[error("JF_ERR_201: Escrow {0} not initialized")]
    NotInitialized(AccountId),

    /// The escrow has already been disbursed.
    #[error("JF_ERR_202: Escrow {0} already settled")]
    AlreadySettled(AccountId),

    /// The operation requires a settled escrow.
    #[error("JF_ERR_203: Escrow {address} not settled (status {status})")]
    NotSettled {
        address: AccountId,
        status: EscrowStatus,
    },

    /// The stake is still time-locked.
    #[error("JF_ERR_204: Stake {key} locked until {unlock_time}")]
    Locked {
        key: StakeKey,
        unlock_time: DateTime<Utc>,
    },

    /// The stake has already been withdrawn.
    #[error("JF_ERR_205: Stake {0} already finished")]
    StakeAlreadyFinished(StakeKey),

    /// An escrow already occupies the address derived from this salt.
    #[error("JF_ERR_206: Escrow already deployed at {0}")]
    EscrowAlreadyDeployed(AccountId),

    /// No escrow is deployed at this address.
    #[error("JF_ERR_207: Escrow not found: {0}")]
    EscrowNotFound(AccountId),

    /// No stake exists under this key.
    #[error("JF_ERR_208: Stake not found: {0}")]
    StakeNotFound(StakeKey),

    /// `perform_upkeep` was invoked while no upkeep is due.
    #[error("JF_ERR_209: Upkeep not needed: {reason}")]
    UpkeepNotNeeded { reason: String },

    // =================================================================
    // Validation (3xx)
    // =================================================================
    /// APR must be a multiple of 3.
    #[error("JF_ERR_300: Invalid APR {0}: must be a multiple of 3")]
    InvalidApr(u32),

    /// An externally supplied debt is below `principal + markup`.
    #[error("JF_ERR_301: Debt {debt} below minimum {minimum}")]
    DebtBelowMinimum { debt: Amount, minimum: Amount },

    /// Stake amount is below the pool minimum.
    #[error("JF_ERR_302: Invalid stake amount {amount}: minimum is {minimum}")]
    InvalidStakeAmount { amount: Amount, minimum: Amount },

    /// The escrow has not been held for the minimum period.
    #[error("JF_ERR_303: Holding period not elapsed: disbursable after {ready_at}")]
    HoldingPeriodNotElapsed { ready_at: DateTime<Utc> },

    /// Any other malformed argument.
    #[error("JF_ERR_304: Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // =================================================================
    // Insufficiency (4xx)
    // =================================================================
    /// Funding is below the required threshold.
    #[error("JF_ERR_400: Not enough funds: need {needed}, have {available}")]
    NotEnoughFunds { needed: Amount, available: Amount },

    /// A token holder cannot cover a transfer.
    #[error("JF_ERR_401: Insufficient {asset} balance for {holder}: need {needed}, have {available}")]
    InsufficientBalance {
        holder: AccountId,
        asset: String,
        needed: Amount,
        available: Amount,
    },

    /// A spender's allowance cannot cover a `transfer_from`.
    #[error("JF_ERR_402: Insufficient {asset} allowance: need {needed}, approved {approved}")]
    InsufficientAllowance {
        asset: String,
        needed: Amount,
        approved: Amount,
    },

    // =================================================================
    // Rate limit (5xx)
    // =================================================================
    /// The teller cooldown has not elapsed since the last privileged action.
    #[error("JF_ERR_500: Withdrawal delay not reached: next action allowed at {ready_at}")]
    WithdrawalDelayNotReached { ready_at: DateTime<Utc> },

    /// A single dispense exceeds the configured ceiling.
    #[error("JF_ERR_501: Max single withdrawal exceeded: {amount} > {max}")]
    MaxSingleWithdrawalExceeded { amount: Amount, max: Amount },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Checked arithmetic overflowed.
    #[error("JF_ERR_900: Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// The ledger clock was asked to move backwards.
    #[error("JF_ERR_901: Clock regression: {requested} is before {current}")]
    ClockRegression {
        current: DateTime<Utc>,
        requested: DateTime<Utc>,
    },

    /// Configuration error (invalid config file, out-of-range values).
    #[error("JF_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("JF_ERR_903: Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("JF_ERR_904: I/O error: {0}")]
    Io(String),

    /// The sequencer task has shut down.
    #[error("JF_ERR_905: Sequencer closed")]
    SequencerClosed,

    /// A conservation invariant (token supply, pool totals) broke.
    #[error("JF_ERR_906: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },
}

impl JurisError {
    /// Failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnAuthorized { .. } | Self::Forbidden { .. } => ErrorKind::Authorization,
            Self::AlreadyInitialized(_)
            | Self::NotInitialized(_)
            | Self::AlreadySettled(_)
            | Self::NotSettled { .. }
            | Self::Locked { .. }
            | Self::StakeAlreadyFinished(_)
            | Self::EscrowAlreadyDeployed(_)
            | Self::EscrowNotFound(_)
            | Self::StakeNotFound(_)
            | Self::UpkeepNotNeeded { .. } => ErrorKind::State,
            Self::InvalidApr(_)
            | Self::DebtBelowMinimum { .. }
            | Self::InvalidStakeAmount { .. }
            | Self::HoldingPeriodNotElapsed { .. }
            | Self::InvalidArgument { .. } => ErrorKind::Validation,
            Self::NotEnoughFunds { .. }
            | Self::InsufficientBalance { .. }
            | Self::InsufficientAllowance { .. } => ErrorKind::Insufficiency,
            Self::WithdrawalDelayNotReached { .. } | Self::MaxSingleWithdrawalExceeded { .. } => {
                ErrorKind::RateLimit
            }
            Self::ArithmeticOverflow(_)
            | Self::ClockRegression { .. }
            | Self::Configuration(_)
            | Self::Serialization(_)
            | Self::Io(_)
            | Self::SequencerClosed
            | Self::SupplyInvariantViolation { .. } => ErrorKind::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, JurisError>;

impl From<std::io::Error> for JurisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for JurisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = JurisError::AlreadyInitialized(AccountId::ZERO);
        let msg = format!("{err}");
        assert!(msg.starts_with("JF_ERR_200"), "Got: {msg}");
    }

    #[test]
    fn not_enough_funds_display() {
        let err = JurisError::NotEnoughFunds {
            needed: 100_005_000_000,
            available: 5_000_000,
        };
        let msg = format!("{err}");
        assert!(msg.contains("JF_ERR_400"));
        assert!(msg.contains("100005000000"));
        assert!(msg.contains("5000000"));
    }

    #[test]
    fn kinds_follow_code_groups() {
        assert_eq!(
            JurisError::UnAuthorized {
                caller: AccountId::ZERO,
                role: "safe"
            }
            .kind(),
            ErrorKind::Authorization
        );
        assert_eq!(JurisError::InvalidApr(28).kind(), ErrorKind::Validation);
        assert_eq!(
            JurisError::MaxSingleWithdrawalExceeded { amount: 2, max: 1 }.kind(),
            ErrorKind::RateLimit
        );
        assert_eq!(
            JurisError::AlreadySettled(AccountId::ZERO).kind(),
            ErrorKind::State
        );
        assert_eq!(JurisError::SequencerClosed.kind(), ErrorKind::Internal);
    }

    #[test]
    fn all_errors_have_jf_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(JurisError::NotInitialized(AccountId::ZERO)),
            Box::new(JurisError::InvalidApr(4)),
            Box::new(JurisError::ArithmeticOverflow("split")),
            Box::new(JurisError::UpkeepNotNeeded {
                reason: "interval".into(),
            }),
            Box::new(JurisError::Configuration("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("JF_ERR_"),
                "Error missing JF_ERR_ prefix: {msg}"
            );
        }
    }
}
