//! # jurisfund-escrow
//!
//! Per-case escrow accounts and the registry that deploys and settles them.
//!
//! ## Modules
//!
//! - [`unit`]: [`EscrowImplementation`], the shared logic behind every escrow
//!   (initialize, deposit, disburse, withdraw)
//! - [`accrual`]: simple-interest debt for `disburse`
//! - [`split`]: settlement split between lawyer, safe, originator, plaintiff
//! - [`address`]: deterministic escrow addresses from a salt
//! - [`registry`]: [`EscrowRegistry`], the factory and the record arena
//! - [`upkeep`]: the periodic check/perform settlement scan
//!
//! Every escrow mutation goes through a [`jurisfund_ledger::LedgerCtx`];
//! nothing here keeps its own clock or token balances.

pub mod accrual;
pub mod address;
pub mod registry;
pub mod split;
pub mod unit;
pub mod upkeep;

pub use accrual::accrued_debt;
pub use address::derive_escrow_address;
pub use registry::{EscrowRegistry, RegistryEntry};
pub use split::compute_split;
pub use unit::EscrowImplementation;
pub use upkeep::{UpkeepCheck, UpkeepReport, UpkeepScheduler};
