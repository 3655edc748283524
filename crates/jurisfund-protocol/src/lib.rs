//! # jurisfund-protocol
//!
//! Entry point of the JurisFund litigation-funding protocol.
//!
//! - [`JurisFund`]: facade over the escrow registry, staking pool and
//!   treasury teller with all-or-nothing calls
//! - [`Sequencer`] / [`SequencerHandle`]: one tokio task owning the facade,
//!   so concurrent callers are applied one at a time
//! - [`Keeper`] / [`run_keeper`]: the upkeep automation loop
//! - [`Genesis`]: initial balances and escrows loaded from JSON
//!
//! The `jurisfund-keeper` binary wires these together.

pub mod fund;
pub mod genesis;
pub mod keeper;
pub mod sequencer;

pub use fund::JurisFund;
pub use genesis::{Genesis, GenesisBalance, GenesisEscrow, GenesisFunding};
pub use jurisfund_escrow::{RegistryEntry, UpkeepCheck, UpkeepReport};
pub use keeper::{Keeper, KeeperStats, run_keeper};
pub use sequencer::{Sequencer, SequencerHandle};
