//! Upkeep scheduling for the escrow registry.
//!
//! An external automation caller polls [`EscrowRegistry::check_upkeep`] and
//! then calls [`EscrowRegistry::perform_upkeep`]. The perform step never
//! trusts the check: it rescans the registry itself, so calling it too
//! early, too late or without a prior check cannot corrupt state.
//!
//! Upkeep is due when both hold:
//! 1. `now - last_upkeep_at >= upkeep_interval`
//! 2. at least one deployed escrow is ACTIVE and funded to its threshold

use chrono::{DateTime, TimeDelta, Utc};
use jurisfund_ledger::{LedgerCtx, TokenLedger};
use jurisfund_types::{AccountId, JurisError, ProtocolEvent, Result};
use serde::{Deserialize, Serialize};

use crate::EscrowRegistry;

/// Interval and batch bookkeeping of the upkeep loop.
#[derive(Debug, Clone)]
pub struct UpkeepScheduler {
    interval: TimeDelta,
    batch_limit: usize,
    last_upkeep_at: DateTime<Utc>,
}

impl UpkeepScheduler {
    #[must_use]
    pub fn new(interval: TimeDelta, batch_limit: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            interval,
            batch_limit,
            last_upkeep_at: started_at,
        }
    }

    #[must_use]
    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    #[must_use]
    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    #[must_use]
    pub fn last_upkeep_at(&self) -> DateTime<Utc> {
        self.last_upkeep_at
    }

    /// Earliest instant the next run may happen.
    #[must_use]
    pub fn next_upkeep_at(&self) -> DateTime<Utc> {
        self.last_upkeep_at
            .checked_add_signed(self.interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    #[must_use]
    pub fn interval_elapsed(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_upkeep_at()
    }
}

/// Result of [`EscrowRegistry::check_upkeep`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpkeepCheck {
    pub needed: bool,
    /// Active, funded escrows at the time of the check.
    pub candidates: Vec<AccountId>,
    pub next_upkeep_at: DateTime<Utc>,
}

/// Result of [`EscrowRegistry::perform_upkeep`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpkeepReport {
    /// Escrows disbursed in this run, in registry order.
    pub settled: Vec<AccountId>,
    /// Candidates left for a later run: still inside their holding period,
    /// failed to disburse, or beyond the batch limit.
    pub skipped: usize,
}

impl EscrowRegistry {
    /// Is upkeep due, and which escrows would it consider? Pure read.
    ///
    /// # Errors
    /// Returns [`JurisError::ArithmeticOverflow`] for absurd principals.
    pub fn check_upkeep(&self, tokens: &dyn TokenLedger, now: DateTime<Utc>) -> Result<UpkeepCheck> {
        let candidates: Vec<AccountId> = self
            .ready_slots(tokens)?
            .into_iter()
            .map(|slot| self.records[slot].address)
            .collect();
        let needed = self.scheduler.interval_elapsed(now) && !candidates.is_empty();
        tracing::debug!(
            needed,
            candidates = candidates.len(),
            last_upkeep_at = %self.scheduler.last_upkeep_at(),
            "Upkeep checked"
        );
        Ok(UpkeepCheck {
            needed,
            candidates,
            next_upkeep_at: self.scheduler.next_upkeep_at(),
        })
    }

    /// Disburse every ready escrow whose holding period has passed, up to
    /// the batch limit, acting as the registry (the originator of each).
    ///
    /// Re-validates the upkeep condition first. On success `last_upkeep_at`
    /// becomes `now` regardless of how many escrows settled.
    ///
    /// # Errors
    /// Returns [`JurisError::UpkeepNotNeeded`] with nothing changed when the
    /// interval has not elapsed or no escrow is ready.
    pub fn perform_upkeep(&mut self, ctx: &mut LedgerCtx<'_>) -> Result<UpkeepReport> {
        if !self.scheduler.interval_elapsed(ctx.now) {
            return Err(JurisError::UpkeepNotNeeded {
                reason: format!(
                    "interval not elapsed, next run at {}",
                    self.scheduler.next_upkeep_at()
                ),
            });
        }
        let slots = self.ready_slots(&*ctx.tokens)?;
        if slots.is_empty() {
            return Err(JurisError::UpkeepNotNeeded {
                reason: "no funded escrow awaiting settlement".into(),
            });
        }

        let mut report = UpkeepReport::default();
        let limit = self.scheduler.batch_limit;
        for slot in slots {
            if report.settled.len() >= limit {
                report.skipped += 1;
                continue;
            }
            let record = &mut self.records[slot];
            if !self.implementation.holding_elapsed(record, ctx.now)? {
                report.skipped += 1;
                continue;
            }
            let address = record.address;
            match self.implementation.disburse(record, self.id, ctx) {
                Ok(_) => report.settled.push(address),
                Err(err) => {
                    tracing::warn!(escrow = %address, error = %err, "Upkeep skipped escrow");
                    report.skipped += 1;
                }
            }
        }

        self.scheduler.last_upkeep_at = ctx.now;
        tracing::info!(
            settled = report.settled.len(),
            skipped = report.skipped,
            "Upkeep performed"
        );
        ctx.emit(
            self.id(),
            ProtocolEvent::UpkeepPerformed {
                settled: report.settled.clone(),
                skipped: report.skipped,
            },
        );
        Ok(report)
    }

    /// Arena slots of ACTIVE escrows funded to their threshold.
    fn ready_slots(&self, tokens: &dyn TokenLedger) -> Result<Vec<usize>> {
        let mut slots = Vec::new();
        for (slot, record) in self.records.iter().enumerate() {
            if record.is_active() && self.implementation().ready(record, tokens)? {
                slots.push(slot);
            }
        }
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use jurisfund_ledger::{EventLog, TokenBook};
    use jurisfund_types::{EscrowInit, EscrowSettings, Salt};

    use super::*;

    const TOKEN: &str = "JUSDC";
    const PRINCIPAL: u128 = 10_000 * 1_000_000;
    const SETTLEMENT: u128 = PRINCIPAL * 10 + 5_000_000;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    struct World {
        registry: EscrowRegistry,
        tokens: TokenBook,
        events: EventLog,
    }

    impl World {
        fn new(batch_limit: usize) -> Self {
            let settings = EscrowSettings {
                upkeep_batch_limit: batch_limit,
                ..EscrowSettings::default()
            };
            Self {
                registry: EscrowRegistry::from_settings(
                    AccountId::derive("registry"),
                    AccountId::derive("implementation"),
                    &settings,
                    t0(),
                )
                .unwrap(),
                tokens: TokenBook::new(),
                events: EventLog::new(),
            }
        }

        fn deploy(&mut self, salt_byte: u8, fund: bool) -> AccountId {
            let init = EscrowInit {
                principal: PRINCIPAL,
                apr: 27,
                plaintiff: AccountId::derive("plaintiff"),
                lawyer: AccountId::derive("lawyer"),
                safe: AccountId::derive("safe"),
                token: TOKEN.into(),
            };
            let mut ctx = LedgerCtx::new(&mut self.tokens, &mut self.events, t0());
            let addr = self
                .registry
                .deploy_escrow(&init, Salt::from_bytes([salt_byte; 32]), &mut ctx)
                .unwrap();
            if fund {
                self.tokens.mint(TOKEN, addr, SETTLEMENT).unwrap();
            }
            addr
        }

        fn check(&self, now: DateTime<Utc>) -> UpkeepCheck {
            self.registry.check_upkeep(&self.tokens, now).unwrap()
        }

        fn perform(&mut self, now: DateTime<Utc>) -> Result<UpkeepReport> {
            let mut ctx = LedgerCtx::new(&mut self.tokens, &mut self.events, now);
            self.registry.perform_upkeep(&mut ctx)
        }
    }

    #[test]
    fn not_needed_before_interval() {
        let mut world = World::new(64);
        world.deploy(1, true);
        let check = world.check(t0() + TimeDelta::hours(3));
        assert!(!check.needed);
        assert_eq!(check.candidates.len(), 1);

        let err = world.perform(t0() + TimeDelta::hours(3)).unwrap_err();
        assert!(matches!(err, JurisError::UpkeepNotNeeded { .. }));
        assert_eq!(world.registry.scheduler.last_upkeep_at(), t0());
        assert_eq!(world.events.count("UpkeepPerformed"), 0);
    }

    #[test]
    fn not_needed_without_funded_escrow() {
        let mut world = World::new(64);
        world.deploy(1, false);
        let now = t0() + TimeDelta::days(2);
        let check = world.check(now);
        assert!(!check.needed);
        assert!(check.candidates.is_empty());
        assert!(world.perform(now).is_err());
    }

    #[test]
    fn run_inside_holding_period_settles_nothing_but_resets_interval() {
        let mut world = World::new(64);
        let addr = world.deploy(1, true);
        let now = t0() + TimeDelta::hours(4);
        assert!(world.check(now).needed);

        let report = world.perform(now).unwrap();
        assert!(report.settled.is_empty());
        assert_eq!(report.skipped, 1);
        assert_eq!(world.registry.scheduler.last_upkeep_at(), now);
        assert!(!world.registry.is_settled(addr).unwrap());
        assert!(!world.check(now + TimeDelta::hours(1)).needed);
    }

    #[test]
    fn settles_ready_escrows_after_holding_period() {
        let mut world = World::new(64);
        let funded = world.deploy(1, true);
        let unfunded = world.deploy(2, false);

        let report = world.perform(t0() + TimeDelta::hours(25)).unwrap();
        assert_eq!(report.settled, vec![funded]);
        assert_eq!(report.skipped, 0);
        assert!(world.registry.is_settled(funded).unwrap());
        assert!(!world.registry.is_settled(unfunded).unwrap());
        assert!(world.registry.entry(funded).unwrap().settled);

        // Nothing left to do.
        let later = t0() + TimeDelta::hours(30);
        assert!(!world.check(later).needed);
        assert!(world.perform(later).is_err());
    }

    #[test]
    fn batch_limit_defers_the_rest() {
        let mut world = World::new(1);
        let first = world.deploy(1, true);
        let second = world.deploy(2, true);

        let now = t0() + TimeDelta::hours(25);
        let report = world.perform(now).unwrap();
        assert_eq!(report.settled, vec![first]);
        assert_eq!(report.skipped, 1);

        let report = world.perform(now + TimeDelta::hours(4)).unwrap();
        assert_eq!(report.settled, vec![second]);
        assert_eq!(world.events.count("UpkeepPerformed"), 2);
        assert_eq!(world.events.count("EscrowSettled"), 2);
    }

    #[test]
    fn scheduler_boundary_is_inclusive() {
        let scheduler = UpkeepScheduler::new(TimeDelta::hours(4), 8, t0());
        assert!(!scheduler.interval_elapsed(t0() + TimeDelta::hours(4) - TimeDelta::seconds(1)));
        assert!(scheduler.interval_elapsed(t0() + TimeDelta::hours(4)));
    }
}
