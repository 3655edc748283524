//! Protocol events for external indexers and the audit trail.
//!
//! Each event fires once per corresponding transition. One operation may
//! journal several: `deploy_escrow` emits `EscrowInitialized` and
//! `EscrowCreated`, and `stake`/`un_stake` follow theirs with
//! `PoolRateUpdated`. Events of a reverted operation are discarded together
//! with its state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, Asset, EventId, PoolState, SettlementSplit, StakeKey};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolEvent {
    /// `initialize` succeeded.
    EscrowInitialized {
        escrow: AccountId,
        principal: Amount,
        apr: u32,
        plaintiff: AccountId,
        lawyer: AccountId,
        originator: AccountId,
        safe: AccountId,
        token: Asset,
    },
    /// Tokens were pulled in through `deposit`.
    EscrowDeposited {
        escrow: AccountId,
        from: AccountId,
        amount: Amount,
        balance: Amount,
    },
    /// Native asset was sent to an escrow outside of `deposit`.
    NativeReceived {
        escrow: AccountId,
        from: AccountId,
        amount: Amount,
    },
    /// The settlement was split between the parties.
    EscrowSettled {
        escrow: AccountId,
        split: SettlementSplit,
        off_chain_debt: bool,
    },
    /// The safe swept residual funds from a settled escrow.
    EscrowSwept {
        escrow: AccountId,
        asset: Asset,
        amount: Amount,
    },
    /// The registry deployed a new escrow.
    EscrowCreated {
        escrow: AccountId,
        salt: crate::Salt,
    },
    /// An upkeep run finished.
    UpkeepPerformed {
        settled: Vec<AccountId>,
        skipped: usize,
    },
    /// A new stake was opened.
    Staked {
        key: StakeKey,
        owner: AccountId,
        amount: Amount,
        liquidity: Amount,
        unlock_time: DateTime<Utc>,
    },
    /// A stake was withdrawn.
    Unstaked {
        key: StakeKey,
        owner: AccountId,
        amount: Amount,
        liquidity: Amount,
    },
    /// Pool totals changed.
    PoolRateUpdated { state: PoolState },
    /// The teller released funds.
    Dispensed {
        asset: Asset,
        to: AccountId,
        amount: Amount,
    },
    /// The teller limits were retuned.
    TellerConfigUpdated {
        withdrawal_delay_secs: u64,
        max_single_withdrawal: Amount,
    },
}

impl ProtocolEvent {
    /// Short stable name, e.g. for log fields and filters.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EscrowInitialized { .. } => "EscrowInitialized",
            Self::EscrowDeposited { .. } => "EscrowDeposited",
            Self::NativeReceived { .. } => "NativeReceived",
            Self::EscrowSettled { .. } => "EscrowSettled",
            Self::EscrowSwept { .. } => "EscrowSwept",
            Self::EscrowCreated { .. } => "EscrowCreated",
            Self::UpkeepPerformed { .. } => "UpkeepPerformed",
            Self::Staked { .. } => "Staked",
            Self::Unstaked { .. } => "Unstaked",
            Self::PoolRateUpdated { .. } => "PoolRateUpdated",
            Self::Dispensed { .. } => "Dispensed",
            Self::TellerConfigUpdated { .. } => "TellerConfigUpdated",
        }
    }
}

/// A journaled event with its ordering metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    /// Position in the journal, starting at 0.
    pub sequence: u64,
    /// The account that emitted the event (escrow, registry, pool, teller).
    pub emitter: AccountId,
    /// Ledger time of the transition.
    pub at: DateTime<Utc>,
    pub event: ProtocolEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        let ev = ProtocolEvent::Dispensed {
            asset: "JUSDC".into(),
            to: AccountId::ZERO,
            amount: 5_000_000,
        };
        assert_eq!(ev.name(), "Dispensed");
    }

    #[test]
    fn event_json_is_keyed_by_kind() {
        let ev = ProtocolEvent::TellerConfigUpdated {
            withdrawal_delay_secs: 2600,
            max_single_withdrawal: 5_000_000,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.starts_with("{\"teller_config_updated\":"), "{json}");
        let back: ProtocolEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
