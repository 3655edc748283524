//! # jurisfund-treasury
//!
//! Capital side of JurisFund.
//!
//! - [`StakingPool`]: stakers lock the pool token for the full period in
//!   exchange for liquidity credit
//! - [`Teller`]: the safe releases treasury funds to borrowers, bounded by a
//!   single-withdrawal ceiling and a shared [`CooldownClock`]
//!
//! Both hold funds in the same treasury account.

pub mod cooldown;
pub mod pool;
pub mod teller;

pub use cooldown::CooldownClock;
pub use pool::StakingPool;
pub use teller::Teller;
