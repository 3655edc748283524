//! Upkeep automation.
//!
//! The keeper is the external trigger of the registry's upkeep: on every
//! tick it moves the ledger clock up to wall time, asks whether upkeep is
//! due and, if so, performs it. All of this runs as one job on the
//! sequencer, so a tick never interleaves with other callers.

use std::{future::Future, time::Duration};

use chrono::Utc;
use jurisfund_types::{AccountId, EventRecord, Result};

use crate::{SequencerHandle, UpkeepReport};

/// What a keeper did before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeeperStats {
    pub ticks: u64,
    /// Ticks that performed upkeep.
    pub runs: u64,
    /// Ticks that failed.
    pub failures: u64,
    /// Escrows settled, in settlement order.
    pub settled: Vec<AccountId>,
}

/// Upkeep driver bound to one sequencer.
pub struct Keeper {
    handle: SequencerHandle,
    tick: Duration,
    /// Next journal sequence not yet logged.
    cursor: u64,
    stats: KeeperStats,
}

impl Keeper {
    #[must_use]
    pub fn new(handle: SequencerHandle, tick: Duration) -> Self {
        Self {
            handle,
            tick,
            cursor: 0,
            stats: KeeperStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> &KeeperStats {
        &self.stats
    }

    /// One check-then-perform cycle. Returns the report when upkeep ran.
    ///
    /// A ledger clock already ahead of wall time is left alone.
    ///
    /// # Errors
    /// Any error of `check_upkeep` / `perform_upkeep`, or
    /// `SequencerClosed`.
    pub async fn tick(&mut self) -> Result<Option<UpkeepReport>> {
        self.stats.ticks += 1;
        let cursor = self.cursor;
        let outcome = self
            .handle
            .submit(move |fund| {
                let wall = Utc::now();
                if wall > fund.now() {
                    fund.advance_time_to(wall)?;
                }
                let report = if fund.check_upkeep()?.needed {
                    Some(fund.perform_upkeep()?)
                } else {
                    None
                };
                let fresh: Vec<EventRecord> = fund.events().since(cursor).to_vec();
                Ok((report, fresh))
            })
            .await;

        let (report, fresh) = match outcome {
            Ok(done) => done,
            Err(err) => {
                self.stats.failures += 1;
                tracing::warn!(error = %err, "Upkeep tick failed");
                return Err(err);
            }
        };
        for record in &fresh {
            tracing::debug!(
                sequence = record.sequence,
                emitter = %record.emitter,
                event = record.event.name(),
                "Journal"
            );
        }
        if let Some(last) = fresh.last() {
            self.cursor = last.sequence + 1;
        }

        match &report {
            Some(report) => {
                self.stats.runs += 1;
                self.stats.settled.extend_from_slice(&report.settled);
                tracing::info!(
                    settled = report.settled.len(),
                    skipped = report.skipped,
                    "Upkeep run complete"
                );
            }
            None => tracing::debug!("No upkeep needed"),
        }
        Ok(report)
    }

    /// Tick until `shutdown` resolves. The first tick fires immediately.
    pub async fn run<S>(mut self, shutdown: S) -> KeeperStats
    where
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.tick);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!(ticks = self.stats.ticks, runs = self.stats.runs, "Keeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    // Failures are counted and logged; the next tick retries.
                    let _ = self.tick().await;
                }
            }
        }
        self.stats
    }
}

/// Run a [`Keeper`] on `handle` every `tick` until `shutdown` resolves.
pub async fn run_keeper<S>(handle: SequencerHandle, tick: Duration, shutdown: S) -> KeeperStats
where
    S: Future<Output = ()>,
{
    Keeper::new(handle, tick).run(shutdown).await
}
