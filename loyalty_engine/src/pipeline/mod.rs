//! # Accrual synchronization pipeline
//!
//! Three stages connected by single-slot channels:
//!
//! ```text
//!  OrderSource ──OrderNumber──▶ AccrualFetcher ──AccrualResult──▶ BalanceUpdater
//!                                    │
//!                                 RateGate
//! ```
//!
//! * [`OrderSource`] rescans storage on a fixed interval and emits every order that is still NEW or PROCESSING.
//! * [`AccrualFetcher`] asks the accrual service about each order and resolves the reply into an [`AccrualResult`].
//!   When the service answers 429, it closes the shared [`RateGate`] and all calls stop until it reopens.
//! * [`BalanceUpdater`] writes each result in its own transaction and credits the owner when points were earned.
//!
//! Each channel holds at most one item, so a slow stage holds back the ones before it and no work piles up in memory.
//! Every stage observes the same [`CancellationToken`].
//!
//! [`AccrualResult`]: crate::db_types::AccrualResult
mod fetcher;
mod order_source;
mod rate_gate;
mod updater;

use std::time::Duration;

pub use fetcher::{AccrualFetcher, FetchOutcome};
use log::*;
pub use order_source::OrderSource;
pub use rate_gate::{RateGate, MAX_ACTIVATION};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
pub use updater::BalanceUpdater;

use crate::{
    accrual::AccrualClient,
    traits::{AccrualLedger, PendingOrders, StorageError},
};

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("Could not discover pending orders: {0}")]
    Discovery(StorageError),
    #[error("The rate gate task failed: {0}")]
    RateGate(String),
}

/// Every hop between stages holds at most this many items.
const HANDOFF_CAPACITY: usize = 1;

/// Wires the three stages together and runs them until cancelled.
pub struct AccrualPipeline<B, C> {
    db: B,
    client: C,
    poll_interval: Duration,
}

impl<B, C> AccrualPipeline<B, C>
where
    B: PendingOrders + AccrualLedger + Clone,
    C: AccrualClient,
{
    pub fn new(db: B, client: C, poll_interval: Duration) -> Self {
        Self { db, client, poll_interval }
    }

    /// Runs the pipeline.
    ///
    /// Returns `Ok(())` once `cancel` fires and every stage has wound down. If the order source cannot read storage,
    /// the other stages are stopped and the discovery error is returned.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), PipelineError> {
        let cancel = cancel.child_token();
        let (order_tx, order_rx) = mpsc::channel(HANDOFF_CAPACITY);
        let (result_tx, result_rx) = mpsc::channel(HANDOFF_CAPACITY);
        let (gate, gate_handle) = RateGate::start(cancel.clone());

        let source = OrderSource::new(self.db.clone(), self.poll_interval, order_tx);
        let fetcher = AccrualFetcher::new(self.client, gate, order_rx, result_tx);
        let updater = BalanceUpdater::new(self.db, result_rx);

        info!("🔄️ Accrual pipeline starting");
        let result = tokio::try_join!(
            source.run(cancel.clone()),
            fetcher.run(cancel.clone()),
            updater.run(cancel.clone())
        );
        // try_join! has already dropped the other stages if one failed. The gate task is all that is left
        cancel.cancel();
        let gate_result = gate_handle.await;
        if let Err(e) = result {
            error!("🔄️ Accrual pipeline stopped with an error: {e}");
            return Err(e);
        }
        gate_result.map_err(|e| PipelineError::RateGate(e.to_string()))?;
        info!("🔄️ Accrual pipeline stopped");
        Ok(())
    }
}
