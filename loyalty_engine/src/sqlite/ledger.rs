use log::trace;
use sqlx::{Sqlite, Transaction};

use super::db::{orders, users};
use crate::{
    db_types::{Balance, OrderNumber, OrderStatus, Points},
    traits::{LedgerTransaction, StorageError},
};

/// A ledger transaction backed by an SQLite transaction. Dropping it without committing rolls back.
pub struct SqliteLedgerTx {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteLedgerTx {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

impl LedgerTransaction for SqliteLedgerTx {
    async fn lock_order_owner(&mut self, order: &OrderNumber) -> Result<i64, StorageError> {
        let user_id = orders::lock_order_owner(order, &mut self.tx).await?;
        trace!("🗃️ Locked order [{order}] owned by user #{user_id}");
        Ok(user_id)
    }

    async fn lock_balance(&mut self, user_id: i64) -> Result<Balance, StorageError> {
        users::lock_user(user_id, &mut self.tx).await
    }

    async fn set_order_outcome(
        &mut self,
        order: &OrderNumber,
        status: OrderStatus,
        accrual: Points,
    ) -> Result<(), StorageError> {
        orders::set_outcome(order, status, accrual, &mut self.tx).await
    }

    async fn increment_balance(&mut self, user_id: i64, delta: Points) -> Result<(), StorageError> {
        users::increment_balance(user_id, delta, &mut self.tx).await
    }

    async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StorageError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
