use crate::{
    db_types::{Balance, OrderNumber, OrderStatus, Points},
    traits::StorageError,
};

/// The ledger that accrual outcomes are written to.
///
/// Every outcome is applied inside its own [`LedgerTransaction`]. Implementations must guarantee that a transaction
/// that is dropped without [`LedgerTransaction::commit`] being called leaves no trace, so that an abandoned update
/// (e.g. on shutdown) is rolled back.
#[allow(async_fn_in_trait)]
pub trait AccrualLedger {
    type Tx: LedgerTransaction;

    async fn begin(&self) -> Result<Self::Tx, StorageError>;
}

/// The operations available inside a single ledger transaction.
///
/// The two `lock_*` methods take an exclusive row lock that is held until the transaction ends. Any other transaction
/// locking the same row (such as a withdrawal) waits until then.
#[allow(async_fn_in_trait)]
pub trait LedgerTransaction {
    /// Locks the order row and returns the id of the user that owns it.
    async fn lock_order_owner(&mut self, order: &OrderNumber) -> Result<i64, StorageError>;

    /// Locks the user row and returns the user's balance as it stands under the lock.
    async fn lock_balance(&mut self, user_id: i64) -> Result<Balance, StorageError>;

    /// Records the outcome for the order. Fails with [`StorageError::OrderAlreadyFinal`] if the order is already
    /// INVALID or PROCESSED.
    async fn set_order_outcome(
        &mut self,
        order: &OrderNumber,
        status: OrderStatus,
        accrual: Points,
    ) -> Result<(), StorageError>;

    async fn increment_balance(&mut self, user_id: i64, delta: Points) -> Result<(), StorageError>;

    async fn commit(self) -> Result<(), StorageError>;

    async fn rollback(self) -> Result<(), StorageError>;
}
