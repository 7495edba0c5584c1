use mockall::mock;

use crate::{
    accrual::{AccrualClient, AccrualClientError, AccrualReply},
    db_types::{Order, OrderNumber, Points, UserAccount, Withdrawal},
    traits::{AccountManagement, InsertOrderResult, PendingOrders, StorageError},
};

mock! {
    pub PendingOrders {}
    impl PendingOrders for PendingOrders {
        async fn fetch_pending_order_numbers(&self) -> Result<Vec<OrderNumber>, StorageError>;
    }
}

mock! {
    pub AccrualClient {}
    impl AccrualClient for AccrualClient {
        async fn fetch_accrual(&self, order: &OrderNumber) -> Result<AccrualReply, AccrualClientError>;
    }
}

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn create_user(&self, login: &str, password_hash: &str) -> Result<UserAccount, StorageError>;
        async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, StorageError>;
        async fn fetch_user_by_login(&self, login: &str) -> Result<Option<UserAccount>, StorageError>;
        async fn insert_order(&self, user_id: i64, number: &OrderNumber) -> Result<InsertOrderResult, StorageError>;
        async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, StorageError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorageError>;
        async fn withdraw(&self, user_id: i64, order: &OrderNumber, amount: Points) -> Result<Withdrawal, StorageError>;
        async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, StorageError>;
    }
}
