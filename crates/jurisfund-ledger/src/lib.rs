//! # jurisfund-ledger
//!
//! World-state collaborators shared by every JurisFund module:
//!
//! - [`TokenLedger`] / [`TokenBook`]: fungible asset balances and allowances
//! - [`LedgerClock`]: monotonic ledger time
//! - [`EventLog`]: append-only journal of protocol events
//! - [`LedgerCtx`]: the three bundled for one state transition
//!
//! None of these know about escrows, stakes or the teller. The protocol
//! crates hold them by `&mut` for the duration of one state transition.

pub mod clock;
pub mod context;
pub mod journal;
pub mod token;

pub use clock::LedgerClock;
pub use context::LedgerCtx;
pub use journal::EventLog;
pub use token::{TokenBook, TokenLedger};
