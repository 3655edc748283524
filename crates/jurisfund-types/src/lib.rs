//! # jurisfund-types
//!
//! Shared types, errors, events and configuration for the **JurisFund**
//! litigation-funding protocol.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`Salt`], [`StakeKey`], [`EventId`]
//! - **Assets**: [`Amount`], [`Asset`]
//! - **Escrow model**: [`EscrowRecord`], [`EscrowStatus`], [`EscrowInit`], [`EscrowData`], [`SettlementSplit`]
//! - **Pool model**: [`Stake`], [`StakeMode`], [`PoolState`], [`PoolConfig`], [`LiquidityTokenInfo`]
//! - **Teller model**: [`TellerConfig`]
//! - **Events**: [`ProtocolEvent`], [`EventRecord`]
//! - **Configuration**: [`ProtocolConfig`], [`DayCount`]
//! - **Errors**: [`JurisError`] with `JF_ERR_` prefix codes
//! - **Constants**: protocol-wide limits and defaults

pub mod asset;
pub mod config;
pub mod constants;
pub mod error;
pub mod escrow;
pub mod event;
pub mod ids;
pub mod pool;
pub mod teller;
pub mod time;

pub use asset::{Amount, Asset};
pub use config::*;
pub use error::*;
pub use escrow::*;
pub use event::*;
pub use ids::*;
pub use pool::*;
pub use teller::*;

// Constants and time helpers are accessed via their modules
// (`jurisfund_types::constants::FOO`, `jurisfund_types::time::deadline`).
