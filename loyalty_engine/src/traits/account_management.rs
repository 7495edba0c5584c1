use crate::{
    db_types::{Order, OrderNumber, Points, UserAccount, Withdrawal},
    traits::StorageError,
};

pub enum InsertOrderResult {
    Inserted(Order),
    AlreadyExists(Order),
}

/// Queries and mutations behind the user-facing account and order flows.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Creates a new user with a zero balance. `password_hash` is stored as given.
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<UserAccount, StorageError>;

    /// Fetches the user account associated with the given id. If no account exists, `None` is returned.
    async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, StorageError>;

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<UserAccount>, StorageError>;

    /// Stores a NEW order for the user. If an order with the same number already exists (for any user), it is left
    /// untouched and returned as [`InsertOrderResult::AlreadyExists`].
    async fn insert_order(&self, user_id: i64, number: &OrderNumber) -> Result<InsertOrderResult, StorageError>;

    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, StorageError>;

    /// All orders uploaded by the user, oldest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorageError>;

    /// Atomically debits `amount` from the user's balance and records the withdrawal against `order`.
    ///
    /// The user row is locked for the duration, so withdrawals serialize with accrual credits for the same user.
    async fn withdraw(&self, user_id: i64, order: &OrderNumber, amount: Points) -> Result<Withdrawal, StorageError>;

    /// All withdrawals made by the user, oldest first.
    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, StorageError>;
}
