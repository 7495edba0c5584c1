use thiserror::Error;

use crate::db_types::{OrderNumber, Points};

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("Order {0} is already in a terminal state")]
    OrderAlreadyFinal(OrderNumber),
    #[error("The login '{0}' is already taken")]
    LoginTaken(String),
    #[error("A withdrawal against order {0} has already been made")]
    DuplicateWithdrawal(OrderNumber),
    #[error("Crediting {amount} would overflow the balance of user #{user_id}")]
    BalanceOverflow { user_id: i64, amount: Points },
    #[error("Insufficient funds. Requested {requested}, but only {available} is available")]
    InsufficientFunds { requested: Points, available: Points },
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}

/// True if the error is a unique constraint violation reported by the database.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
