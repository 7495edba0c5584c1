use crate::{db_types::OrderNumber, traits::StorageError};

/// Discovery of orders whose accrual outcome is not yet final.
#[allow(async_fn_in_trait)]
pub trait PendingOrders {
    /// Returns the numbers of every order in the NEW or PROCESSING state, oldest upload first.
    async fn fetch_pending_order_numbers(&self) -> Result<Vec<OrderNumber>, StorageError>;
}
