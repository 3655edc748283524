//! Initial world state for a protocol instance.
//!
//! A genesis document seeds token balances and deploys (and optionally
//! funds) escrows before the keeper starts ticking. It is plain JSON:
//!
//! ```json
//! {
//!   "start": "2025-01-01T00:00:00Z",
//!   "balances": [{ "asset": "JUSDC", "holder": "0x…", "amount": 100005000000 }],
//!   "escrows": [{
//!     "salt": "0xef50…",
//!     "init": { "principal": 10000000000, "apr": 27, "plaintiff": "0x…",
//!               "lawyer": "0x…", "safe": "0x…", "token": "JUSDC" },
//!     "funding": { "from": "0x…", "amount": 100005000000 }
//!   }]
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use jurisfund_types::{AccountId, Amount, Asset, EscrowInit, Result, Salt};
use serde::{Deserialize, Serialize};

use crate::JurisFund;

/// Tokens credited to one holder at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub asset: Asset,
    pub holder: AccountId,
    pub amount: Amount,
}

/// A deposit made right after deployment. `from` must hold the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisFunding {
    pub from: AccountId,
    pub amount: Amount,
}

/// One escrow to deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisEscrow {
    pub salt: Salt,
    pub init: EscrowInit,
    #[serde(default)]
    pub funding: Option<GenesisFunding>,
}

/// Everything applied to a fresh [`JurisFund`] before it goes live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genesis {
    /// Ledger start time; wall time when absent.
    pub start: Option<DateTime<Utc>>,
    pub balances: Vec<GenesisBalance>,
    pub escrows: Vec<GenesisEscrow>,
}

impl Genesis {
    /// # Errors
    /// Returns [`jurisfund_types::JurisError::Serialization`] on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// As [`Self::from_json_str`], plus [`jurisfund_types::JurisError::Io`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Mint the balances, then deploy and fund the escrows in order.
    /// Returns the deployed addresses.
    ///
    /// # Errors
    /// The first failing mint, deployment or deposit. Earlier steps stay
    /// applied; each deployment and deposit is itself all-or-nothing.
    pub fn apply(&self, fund: &mut JurisFund) -> Result<Vec<AccountId>> {
        for balance in &self.balances {
            fund.mint(&balance.asset, balance.holder, balance.amount)?;
        }

        let mut deployed = Vec::with_capacity(self.escrows.len());
        for escrow in &self.escrows {
            let address = fund.deploy_escrow(&escrow.init, escrow.salt)?;
            if let Some(funding) = &escrow.funding {
                fund.approve(&escrow.init.token, funding.from, address, funding.amount);
                fund.deposit(address, funding.from, funding.amount)?;
            }
            deployed.push(address);
        }

        tracing::info!(
            balances = self.balances.len(),
            escrows = deployed.len(),
            "Genesis applied"
        );
        Ok(deployed)
    }
}
