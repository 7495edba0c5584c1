use log::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::PipelineError;
use crate::{
    db_types::AccrualResult,
    traits::{AccrualLedger, LedgerTransaction, StorageError},
};

/// Applies resolved accrual outcomes to the ledger, one transaction per outcome.
pub struct BalanceUpdater<L> {
    ledger: L,
    results: mpsc::Receiver<AccrualResult>,
}

impl<L> BalanceUpdater<L>
where L: AccrualLedger
{
    pub fn new(ledger: L, results: mpsc::Receiver<AccrualResult>) -> Self {
        Self { ledger, results }
    }

    /// Runs until cancelled or the fetcher hangs up. A failed update is rolled back and logged; the order stays pending
    /// and will come round again on a later scan.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), PipelineError> {
        info!("📒️ Balance updater started");
        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                next = self.results.recv() => match next {
                    Some(result) => result,
                    None => break,
                },
            };
            // An update abandoned here is dropped mid-transaction, which rolls it back
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("📒️ Shutting down. Abandoned update for {result}");
                    break;
                },
                applied = self.apply(&result) => {
                    if let Err(e) = applied {
                        error!("📒️ Could not apply {result}: {e}");
                    }
                },
            }
        }
        info!("📒️ Balance updater stopped");
        Ok(())
    }

    /// Applies a single outcome atomically: lock the order and its owner, record the outcome, credit any accrual.
    /// Either everything is committed or nothing is.
    pub async fn apply(&self, result: &AccrualResult) -> Result<(), StorageError> {
        let mut tx = self.ledger.begin().await?;
        match apply_in_tx(&mut tx, result).await {
            Ok(()) => {
                tx.commit().await?;
                debug!("📒️ Applied {result}");
                Ok(())
            },
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("📒️ Rollback after failed update for [{}] also failed: {rollback_err}", result.order);
                }
                Err(e)
            },
        }
    }
}

async fn apply_in_tx<T: LedgerTransaction>(tx: &mut T, result: &AccrualResult) -> Result<(), StorageError> {
    let user_id = tx.lock_order_owner(&result.order).await?;
    let balance = tx.lock_balance(user_id).await?;
    tx.set_order_outcome(&result.order, result.status, result.accrual).await?;
    if !result.accrual.is_zero() {
        let new_balance = balance
            .current
            .checked_add(result.accrual)
            .ok_or(StorageError::BalanceOverflow { user_id, amount: result.accrual })?;
        tx.increment_balance(user_id, result.accrual).await?;
        info!(
            "📒️ Credited {} points to user #{user_id} for order [{}]. Balance {} -> {new_balance}",
            result.accrual, result.order, balance.current
        );
    }
    Ok(())
}
