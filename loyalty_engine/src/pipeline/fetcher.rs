use log::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{PipelineError, RateGate};
use crate::{
    accrual::{AccrualClient, AccrualRecord, AccrualReply, AccrualStatus},
    db_types::{AccrualResult, OrderNumber, Points},
};

/// What became of a single order after asking the accrual service about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A definite answer to hand to the balance updater.
    Resolved(AccrualResult),
    /// The rate gate was closed, so the service was not called.
    Throttled,
    /// The service asked us to back off and the gate has been closed.
    RateLimited,
    /// Something went wrong. The order will be retried on a later scan.
    Failed(String),
}

/// Turns order numbers into resolved accrual outcomes by querying the accrual service.
pub struct AccrualFetcher<C> {
    client: C,
    gate: RateGate,
    orders: mpsc::Receiver<OrderNumber>,
    results: mpsc::Sender<AccrualResult>,
}

impl<C> AccrualFetcher<C>
where C: AccrualClient
{
    pub fn new(
        client: C,
        gate: RateGate,
        orders: mpsc::Receiver<OrderNumber>,
        results: mpsc::Sender<AccrualResult>,
    ) -> Self {
        Self { client, gate, orders, results }
    }

    /// Runs until cancelled or the order source hangs up. Per-order failures are logged and never stop the stage.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), PipelineError> {
        info!("🧮️ Accrual fetcher started");
        loop {
            let order = tokio::select! {
                _ = cancel.cancelled() => break,
                next = self.orders.recv() => match next {
                    Some(order) => order,
                    None => break,
                },
            };
            // Dropping an in-flight request aborts it
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.resolve(&order) => outcome,
            };
            let result = match outcome {
                FetchOutcome::Resolved(result) => result,
                FetchOutcome::Failed(reason) => {
                    warn!("🧮️ Could not resolve order [{order}]: {reason}");
                    continue;
                },
                FetchOutcome::Throttled | FetchOutcome::RateLimited => continue,
            };
            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = self.results.send(result) => {
                    if sent.is_err() {
                        info!("🧮️ Balance updater has gone away. Accrual fetcher stopping");
                        break;
                    }
                },
            }
        }
        info!("🧮️ Accrual fetcher stopped");
        Ok(())
    }

    /// Queries the accrual service for one order, honouring the rate gate.
    pub async fn resolve(&self, order: &OrderNumber) -> FetchOutcome {
        if self.gate.is_active() {
            trace!("🧮️ Rate gate closed. Skipping [{order}] for now");
            return FetchOutcome::Throttled;
        }
        let reply = match self.client.fetch_accrual(order).await {
            Ok(reply) => reply,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };
        match reply {
            AccrualReply::Registered(record) => {
                let result = resolve_record(order, record);
                debug!("🧮️ Resolved {result}");
                FetchOutcome::Resolved(result)
            },
            AccrualReply::NotRegistered => {
                debug!("🧮️ Order [{order}] is unknown to the accrual service. Marking it INVALID");
                FetchOutcome::Resolved(AccrualResult::invalid(order.clone()))
            },
            AccrualReply::TooManyRequests { retry_after: Some(wait) } => {
                warn!("🧮️ Accrual service is rate limiting us. Backing off for {wait:?}");
                self.gate.activate(wait);
                FetchOutcome::RateLimited
            },
            AccrualReply::TooManyRequests { retry_after: None } => {
                FetchOutcome::Failed("rate limited without a usable Retry-After header".to_string())
            },
            AccrualReply::Unexpected { status } => FetchOutcome::Failed(format!("unexpected HTTP status {status}")),
        }
    }
}

/// Interprets a 200 reply for `requested`.
///
/// A record for some other order is treated as INVALID. Accrual is only carried for PROCESSED orders so that a user is
/// credited exactly once, on the final transition.
fn resolve_record(requested: &OrderNumber, record: AccrualRecord) -> AccrualResult {
    if record.order != requested.as_str() {
        warn!("🧮️ Asked about order [{requested}] but the accrual service answered for [{}]", record.order);
        return AccrualResult::invalid(requested.clone());
    }
    let accrual = match record.status {
        AccrualStatus::Processed => record.accrual.unwrap_or_default(),
        _ => Points::zero(),
    };
    AccrualResult::new(requested.clone(), record.status.order_status(), accrual)
}
