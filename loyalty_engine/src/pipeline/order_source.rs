use std::time::Duration;

use log::*;
use tokio::{
    sync::mpsc,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::PipelineError;
use crate::{db_types::OrderNumber, traits::PendingOrders};

/// Periodically lists every order that still needs an accrual outcome and hands the numbers downstream, one at a
/// time.
///
/// Each tick is a full rescan, so an order whose last attempt failed is simply picked up again on the next tick. An
/// order may be emitted more than once; applying an outcome twice is harmless because terminal orders cannot change.
pub struct OrderSource<S> {
    db: S,
    poll_interval: Duration,
    orders: mpsc::Sender<OrderNumber>,
}

impl<S> OrderSource<S>
where S: PendingOrders
{
    pub fn new(db: S, poll_interval: Duration, orders: mpsc::Sender<OrderNumber>) -> Self {
        Self { db, poll_interval, orders }
    }

    /// Runs until cancelled, or until the downstream stage goes away. A storage failure is fatal and is returned to the
    /// caller.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), PipelineError> {
        let mut timer = interval(self.poll_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("🔎️ Order source started. Polling every {:?}", self.poll_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = timer.tick() => {},
            }
            let numbers = tokio::select! {
                _ = cancel.cancelled() => break,
                numbers = self.db.fetch_pending_order_numbers() => numbers,
            };
            let numbers = numbers.map_err(|e| {
                error!("🔎️ Could not list pending orders: {e}");
                PipelineError::Discovery(e)
            })?;
            trace!("🔎️ {} orders awaiting an accrual outcome", numbers.len());
            for number in numbers {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("🔎️ Order source stopped");
                        return Ok(());
                    },
                    sent = self.orders.send(number) => {
                        if sent.is_err() {
                            info!("🔎️ Accrual fetcher has gone away. Order source stopping");
                            return Ok(());
                        }
                    },
                }
            }
        }
        info!("🔎️ Order source stopped");
        Ok(())
    }
}
