//! # EscrowRecord: one per litigation case
//!
//! An escrow holds the settlement paid for a single case and splits it
//! between the parties exactly once.
//!
//! ## State Machine
//!
//! ```text
//!   ┌───────────────┐  initialize   ┌────────┐  disburse   ┌─────────┐
//!   │ UNINITIALIZED ├──────────────▶│ ACTIVE ├────────────▶│ SETTLED │
//!   └───────────────┘               └────────┘             └─────────┘
//! ```
//!
//! Transitions are monotonic. A settled record stays as an audit record and
//! only allows the safe to sweep residual dust.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, Asset, JurisError, Result, constants};

/// Lifecycle state of an escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Deployed with zero storage; `initialize` not yet called.
    Uninitialized,
    /// Initialized and accepting funds.
    Active,
    /// Funds have been split. **Irreversible.**
    Settled,
}

impl EscrowStatus {
    /// Can this escrow transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Uninitialized, Self::Active) | (Self::Active, Self::Settled)
        )
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "UNINITIALIZED"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Settled => write!(f, "SETTLED"),
        }
    }
}

/// Arguments of `initialize`. Also the init payload handed to the registry
/// when deploying a new escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowInit {
    /// Amount advanced to the plaintiff.
    pub principal: Amount,
    /// Annual rate in percent. Must be a multiple of 3.
    pub apr: u32,
    pub plaintiff: AccountId,
    pub lawyer: AccountId,
    /// Privileged settlement authority.
    pub safe: AccountId,
    /// Settlement token.
    pub token: Asset,
}

/// Stored state of one escrow unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Deterministic address of this escrow.
    pub address: AccountId,
    pub status: EscrowStatus,
    /// Set by `initialize`.
    pub created_at: Option<DateTime<Utc>>,
    pub apr: u32,
    pub principal: Amount,
    /// Fixed markup copied from the implementation at initialization.
    pub markup: Amount,
    pub token: Asset,
    pub plaintiff: AccountId,
    pub lawyer: AccountId,
    /// The authority that initialized the escrow.
    pub originator: AccountId,
    pub safe: AccountId,
}

impl EscrowRecord {
    /// A freshly deployed escrow with zero storage.
    #[must_use]
    pub fn uninitialized(address: AccountId) -> Self {
        Self {
            address,
            status: EscrowStatus::Uninitialized,
            created_at: None,
            apr: 0,
            principal: 0,
            markup: 0,
            token: Asset::new(),
            plaintiff: AccountId::ZERO,
            lawyer: AccountId::ZERO,
            originator: AccountId::ZERO,
            safe: AccountId::ZERO,
        }
    }

    /// Minimum funding before the escrow is disbursable:
    /// `principal * 10 + markup`.
    ///
    /// # Errors
    /// Returns [`JurisError::ArithmeticOverflow`] for absurd principals.
    pub fn settlement_threshold(&self) -> Result<Amount> {
        let base = crate::asset::checked_mul(
            self.principal,
            constants::SETTLEMENT_MULTIPLIER,
            "settlement threshold",
        )?;
        crate::asset::checked_add(base, self.markup, "settlement threshold")
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EscrowStatus::Active
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status == EscrowStatus::Settled
    }

    /// Attempt to transition to ACTIVE.
    ///
    /// # Errors
    /// Returns [`JurisError::AlreadyInitialized`] unless currently UNINITIALIZED.
    pub fn mark_active(&mut self) -> Result<()> {
        if !self.status.can_transition_to(EscrowStatus::Active) {
            return Err(JurisError::AlreadyInitialized(self.address));
        }
        self.status = EscrowStatus::Active;
        Ok(())
    }

    /// Attempt to transition to SETTLED.
    ///
    /// # Errors
    /// Returns [`JurisError::AlreadySettled`] or [`JurisError::NotInitialized`]
    /// unless currently ACTIVE.
    pub fn mark_settled(&mut self) -> Result<()> {
        match self.status {
            EscrowStatus::Active => {
                self.status = EscrowStatus::Settled;
                Ok(())
            }
            EscrowStatus::Settled => Err(JurisError::AlreadySettled(self.address)),
            EscrowStatus::Uninitialized => Err(JurisError::NotInitialized(self.address)),
        }
    }

    /// Read-only view returned by `get_escrow_data`.
    #[must_use]
    pub fn data(&self) -> EscrowData {
        EscrowData {
            address: self.address,
            status: self.status,
            created_at: self.created_at,
            principal: self.principal,
            apr: self.apr,
            markup: self.markup,
            token: self.token.clone(),
            plaintiff: self.plaintiff,
            lawyer: self.lawyer,
            originator: self.originator,
            safe: self.safe,
        }
    }
}

/// Public view of an escrow's terms and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowData {
    pub address: AccountId,
    pub status: EscrowStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub principal: Amount,
    pub apr: u32,
    pub markup: Amount,
    pub token: Asset,
    pub plaintiff: AccountId,
    pub lawyer: AccountId,
    pub originator: AccountId,
    pub safe: AccountId,
}

/// How a settlement `S` was split for a debt `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSplit {
    /// Full escrow balance at disbursement.
    pub settlement: Amount,
    /// Debt owed to the fund (computed or supplied off-chain).
    pub debt: Amount,
    /// 30% of the settlement.
    pub lawyer: Amount,
    /// 3% of the debt plus the markup.
    pub safe: Amount,
    /// The debt minus the safe's 3% cut.
    pub originator: Amount,
    /// Whatever is left: `S - D - markup - lawyer`.
    pub plaintiff: Amount,
}

impl SettlementSplit {
    /// Sum of all paid shares.
    #[must_use]
    pub fn total_paid(&self) -> Amount {
        self.lawyer + self.safe + self.originator + self.plaintiff
    }

    /// Rounding remainder left in the escrow.
    #[must_use]
    pub fn residual(&self) -> Amount {
        self.settlement.saturating_sub(self.total_paid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> EscrowRecord {
        let mut record = EscrowRecord::uninitialized(AccountId::derive("escrow"));
        record.principal = 10_000 * 1_000_000;
        record.markup = 5_000_000;
        record
    }

    #[test]
    fn state_transitions_valid() {
        assert!(EscrowStatus::Uninitialized.can_transition_to(EscrowStatus::Active));
        assert!(EscrowStatus::Active.can_transition_to(EscrowStatus::Settled));
    }

    #[test]
    fn state_transitions_invalid() {
        assert!(!EscrowStatus::Uninitialized.can_transition_to(EscrowStatus::Settled));
        assert!(!EscrowStatus::Active.can_transition_to(EscrowStatus::Uninitialized));
        assert!(!EscrowStatus::Settled.can_transition_to(EscrowStatus::Active));
        assert!(!EscrowStatus::Settled.can_transition_to(EscrowStatus::Uninitialized));
    }

    #[test]
    fn threshold_is_ten_principals_plus_markup() {
        let record = make_record();
        assert_eq!(record.settlement_threshold().unwrap(), 100_005_000_000);
    }

    #[test]
    fn double_activation_blocked() {
        let mut record = make_record();
        record.mark_active().unwrap();
        let err = record.mark_active().unwrap_err();
        assert!(matches!(err, JurisError::AlreadyInitialized(_)));
    }

    #[test]
    fn double_settlement_blocked() {
        let mut record = make_record();
        record.mark_active().unwrap();
        record.mark_settled().unwrap();
        let err = record.mark_settled().unwrap_err();
        assert!(matches!(err, JurisError::AlreadySettled(_)));
        assert!(record.is_settled());
    }

    #[test]
    fn settle_before_init_blocked() {
        let mut record = make_record();
        let err = record.mark_settled().unwrap_err();
        assert!(matches!(err, JurisError::NotInitialized(_)));
    }

    #[test]
    fn split_residual() {
        let split = SettlementSplit {
            settlement: 100,
            debt: 20,
            lawyer: 30,
            safe: 10,
            originator: 19,
            plaintiff: 40,
        };
        assert_eq!(split.total_paid(), 99);
        assert_eq!(split.residual(), 1);
    }

    #[test]
    fn status_display() {
        assert_eq!(EscrowStatus::Active.to_string(), "ACTIVE");
        assert_eq!(EscrowStatus::Settled.to_string(), "SETTLED");
    }
}
