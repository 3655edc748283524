//! Escrow registry and factory.
//!
//! Escrow records live in an arena indexed by their derived address. The
//! registry is the originator of every escrow it deploys, so the upkeep run
//! may disburse them on its own authority.
//!
//! ```text
//!   NotDeployed ──deploy_escrow──▶ Deployed(Active) ──disburse──▶ Deployed(Settled)
//! ```

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use jurisfund_ledger::{LedgerCtx, TokenLedger};
use jurisfund_types::{
    AccountId, Amount, EscrowData, EscrowInit, EscrowRecord, EscrowSettings, JurisError,
    ProtocolEvent, Result, Salt, SettlementSplit, time,
};
use serde::{Deserialize, Serialize};

use crate::{EscrowImplementation, address::derive_escrow_address, upkeep::UpkeepScheduler};

/// Registry view of one deployed escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub salt: Salt,
    pub address: AccountId,
    pub deployed: bool,
    /// Mirrors the escrow's status.
    pub settled: bool,
    pub deployed_at: DateTime<Utc>,
}

/// Deterministic-address factory plus the arena of deployed escrows.
#[derive(Debug, Clone)]
pub struct EscrowRegistry {
    pub(crate) id: AccountId,
    pub(crate) implementation: EscrowImplementation,
    /// Arena of escrow records, in deployment order.
    pub(crate) records: Vec<EscrowRecord>,
    /// `(salt, deployed_at)` parallel to `records`.
    deployments: Vec<(Salt, DateTime<Utc>)>,
    /// Address → arena slot.
    index: HashMap<AccountId, usize>,
    pub(crate) scheduler: UpkeepScheduler,
}

impl EscrowRegistry {
    /// Create an empty registry. The upkeep interval starts counting at
    /// `started_at`.
    #[must_use]
    pub fn new(
        id: AccountId,
        implementation: EscrowImplementation,
        upkeep_interval: TimeDelta,
        upkeep_batch_limit: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            implementation,
            records: Vec::new(),
            deployments: Vec::new(),
            index: HashMap::new(),
            scheduler: UpkeepScheduler::new(upkeep_interval, upkeep_batch_limit, started_at),
        }
    }

    /// Build from configured settings.
    ///
    /// # Errors
    /// Returns [`JurisError::Configuration`] for out-of-range durations.
    pub fn from_settings(
        id: AccountId,
        implementation_id: AccountId,
        settings: &EscrowSettings,
        started_at: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self::new(
            id,
            EscrowImplementation::from_settings(implementation_id, settings)?,
            time::to_delta(settings.upkeep_interval)?,
            settings.upkeep_batch_limit,
            started_at,
        ))
    }

    #[must_use]
    pub fn id(&self) -> AccountId {
        self.id
    }

    #[must_use]
    pub fn implementation(&self) -> &EscrowImplementation {
        &self.implementation
    }

    // -----------------------------------------------------------------
    // Factory
    // -----------------------------------------------------------------

    /// Address a deployment with `salt` occupies. Same value before and
    /// after deployment.
    #[must_use]
    pub fn pre_calculate_escrow_address(&self, salt: &Salt) -> AccountId {
        derive_escrow_address(salt, &self.implementation.id(), &self.id)
    }

    /// Deploy a new escrow at the address derived from `salt` and initialize
    /// it with `init`. Funds already sent to that address stay with it.
    ///
    /// # Errors
    /// - `EscrowAlreadyDeployed` if the salt was used before
    /// - any `initialize` error; nothing is recorded in that case
    pub fn deploy_escrow(
        &mut self,
        init: &EscrowInit,
        salt: Salt,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<AccountId> {
        let address = self.pre_calculate_escrow_address(&salt);
        if self.index.contains_key(&address) {
            return Err(JurisError::EscrowAlreadyDeployed(address));
        }

        let mut record = EscrowRecord::uninitialized(address);
        self.implementation
            .initialize(&mut record, self.id, init, ctx)?;

        let slot = self.records.len();
        self.records.push(record);
        self.deployments.push((salt, ctx.now));
        self.index.insert(address, slot);

        tracing::info!(escrow = %address, salt = %salt, slot, "Escrow deployed");
        ctx.emit(
            self.id,
            ProtocolEvent::EscrowCreated {
                escrow: address,
                salt,
            },
        );
        Ok(address)
    }

    // -----------------------------------------------------------------
    // Escrow operations by address
    // -----------------------------------------------------------------

    /// # Errors
    /// `EscrowNotFound`, or any [`EscrowImplementation::deposit`] error.
    pub fn deposit(
        &self,
        escrow: AccountId,
        from: AccountId,
        amount: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<Amount> {
        let record = self.escrow(escrow)?;
        self.implementation.deposit(record, from, amount, ctx)
    }

    /// # Errors
    /// `EscrowNotFound`, or a token ledger error.
    pub fn receive_native(
        &self,
        escrow: AccountId,
        from: AccountId,
        amount: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<()> {
        let record = self.escrow(escrow)?;
        self.implementation.receive_native(record, from, amount, ctx)
    }

    /// # Errors
    /// `EscrowNotFound`, or any [`EscrowImplementation::disburse`] error.
    pub fn disburse(
        &mut self,
        escrow: AccountId,
        caller: AccountId,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<SettlementSplit> {
        let slot = self.slot(escrow)?;
        self.implementation
            .disburse(&mut self.records[slot], caller, ctx)
    }

    /// # Errors
    /// `EscrowNotFound`, or any
    /// [`EscrowImplementation::disburse_with_off_chain_apr`] error.
    pub fn disburse_with_off_chain_apr(
        &mut self,
        escrow: AccountId,
        caller: AccountId,
        debt: Amount,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<SettlementSplit> {
        let slot = self.slot(escrow)?;
        self.implementation
            .disburse_with_off_chain_apr(&mut self.records[slot], caller, debt, ctx)
    }

    /// # Errors
    /// `EscrowNotFound`, or any [`EscrowImplementation::withdraw`] error.
    pub fn withdraw(
        &self,
        escrow: AccountId,
        caller: AccountId,
        asset: &str,
        ctx: &mut LedgerCtx<'_>,
    ) -> Result<Amount> {
        let record = self.escrow(escrow)?;
        self.implementation.withdraw(record, caller, asset, ctx)
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// # Errors
    /// `EscrowNotFound` for an unknown address.
    pub fn escrow(&self, escrow: AccountId) -> Result<&EscrowRecord> {
        Ok(&self.records[self.slot(escrow)?])
    }

    /// # Errors
    /// `EscrowNotFound` for an unknown address.
    pub fn escrow_data(&self, escrow: AccountId) -> Result<EscrowData> {
        self.escrow(escrow).map(EscrowRecord::data)
    }

    /// # Errors
    /// `EscrowNotFound` for an unknown address.
    pub fn is_settled(&self, escrow: AccountId) -> Result<bool> {
        self.escrow(escrow).map(EscrowRecord::is_settled)
    }

    /// # Errors
    /// `EscrowNotFound` for an unknown address.
    pub fn balance(&self, escrow: AccountId, tokens: &dyn TokenLedger) -> Result<Amount> {
        let record = self.escrow(escrow)?;
        Ok(self.implementation.balance(record, tokens))
    }

    /// # Errors
    /// `EscrowNotFound` for an unknown address.
    pub fn ready(&self, escrow: AccountId, tokens: &dyn TokenLedger) -> Result<bool> {
        let record = self.escrow(escrow)?;
        self.implementation.ready(record, tokens)
    }

    /// Deployed escrows in deployment order.
    pub fn escrows(&self) -> impl Iterator<Item = &EscrowRecord> {
        self.records.iter()
    }

    /// Registry view of one escrow, `None` if nothing is deployed there.
    #[must_use]
    pub fn entry(&self, escrow: AccountId) -> Option<RegistryEntry> {
        let slot = *self.index.get(&escrow)?;
        let (salt, deployed_at) = self.deployments[slot];
        Some(RegistryEntry {
            salt,
            address: escrow,
            deployed: true,
            settled: self.records[slot].is_settled(),
            deployed_at,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn slot(&self, escrow: AccountId) -> Result<usize> {
        self.index
            .get(&escrow)
            .copied()
            .ok_or(JurisError::EscrowNotFound(escrow))
    }
}
