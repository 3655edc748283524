//! Single-writer sequencer.
//!
//! Concurrent callers never touch [`JurisFund`] directly. They submit
//! closures over a bounded channel; one tokio task owns the facade and runs
//! the closures strictly in arrival order, each to completion. Whichever
//! conflicting call is ordered first wins and the later one fails
//! deterministically.

use jurisfund_types::{JurisError, Result};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::JurisFund;

type Job = Box<dyn FnOnce(&mut JurisFund) + Send>;

/// Default queue depth of [`Sequencer::spawn`].
pub const DEFAULT_QUEUE_DEPTH: usize = 1024;

/// The task that owns the protocol state.
pub struct Sequencer;

impl Sequencer {
    /// Move `fund` onto its own task. The task ends, returning the final
    /// state, once every handle has been dropped.
    #[must_use]
    pub fn spawn(fund: JurisFund, queue_depth: usize) -> (SequencerHandle, JoinHandle<JurisFund>) {
        let (tx, mut rx) = mpsc::channel::<Job>(queue_depth.max(1));
        let task = tokio::spawn(async move {
            let mut fund = fund;
            let mut processed: u64 = 0;
            while let Some(job) = rx.recv().await {
                job(&mut fund);
                processed += 1;
            }
            tracing::info!(processed, "Sequencer stopped");
            fund
        });
        (SequencerHandle { tx }, task)
    }
}

/// Cloneable submission handle.
#[derive(Clone)]
pub struct SequencerHandle {
    tx: mpsc::Sender<Job>,
}

impl SequencerHandle {
    /// Run `op` on the sequencer and wait for its result.
    ///
    /// # Errors
    /// Whatever `op` returns, or [`JurisError::SequencerClosed`] if the
    /// sequencer task is gone.
    pub async fn submit<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut JurisFund) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |fund| {
            if reply_tx.send(op(fund)).is_err() {
                tracing::debug!("Submitter went away before the reply");
            }
        });
        self.tx
            .send(job)
            .await
            .map_err(|_| JurisError::SequencerClosed)?;
        reply_rx.await.map_err(|_| JurisError::SequencerClosed)?
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use jurisfund_types::{AccountId, ProtocolConfig};

    use super::*;

    fn fund() -> JurisFund {
        JurisFund::with_start(
            ProtocolConfig::default(),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn racing_dispenses_serialize() {
        let mut fund = fund();
        let treasury = fund.treasury();
        let safe = fund.safe();
        fund.mint("JUSDC", treasury, 10_000_000).unwrap();
        let (handle, task) = Sequencer::spawn(fund, 16);

        let mut joins = Vec::new();
        for i in 0..4u8 {
            let handle = handle.clone();
            joins.push(tokio::spawn(async move {
                handle
                    .submit(move |f| f.dispense(safe, "JUSDC", AccountId::from_bytes([i; 20]), 1_000))
                    .await
            }));
        }
        let mut ok = 0;
        for join in joins {
            match join.await.unwrap() {
                Ok(()) => ok += 1,
                Err(err) => assert!(matches!(err, JurisError::WithdrawalDelayNotReached { .. })),
            }
        }
        assert_eq!(ok, 1, "only the first dispense inside the cooldown may succeed");

        handle
            .submit(|f| f.advance_time(TimeDelta::hours(1)).map(|_| ()))
            .await
            .unwrap();
        handle
            .submit(move |f| f.dispense(safe, "JUSDC", safe, 1_000))
            .await
            .unwrap();

        drop(handle);
        let fund = task.await.unwrap();
        assert_eq!(fund.events().count("Dispensed"), 2);
        assert_eq!(fund.balance_of("JUSDC", treasury), 10_000_000 - 2_000);
    }

    #[tokio::test]
    async fn closed_sequencer_reports_error() {
        let (handle, task) = Sequencer::spawn(fund(), 1);
        task.abort();
        let _ = task.await;
        let err = handle.submit(|f| Ok(f.now())).await.unwrap_err();
        assert!(matches!(err, JurisError::SequencerClosed));
    }
}
