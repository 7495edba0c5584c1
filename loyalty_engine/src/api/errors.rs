use thiserror::Error;

use crate::{
    db_types::{OrderNumber, Points},
    traits::StorageError,
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("'{0}' is not a valid order number")]
    InvalidOrderNumber(String),
    #[error("Withdrawal amount must be positive, not {0}")]
    InvalidAmount(Points),
    #[error("Insufficient funds. Requested {requested}, but only {available} is available")]
    InsufficientFunds { requested: Points, available: Points },
    #[error("The login '{0}' is already taken")]
    LoginTaken(String),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("A withdrawal against order {0} has already been made")]
    DuplicateWithdrawal(OrderNumber),
}

impl From<StorageError> for AccountApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InsufficientFunds { requested, available } => {
                AccountApiError::InsufficientFunds { requested, available }
            },
            StorageError::LoginTaken(login) => AccountApiError::LoginTaken(login),
            StorageError::UserNotFound(id) => AccountApiError::UserNotFound(id),
            StorageError::DuplicateWithdrawal(order) => AccountApiError::DuplicateWithdrawal(order),
            other => AccountApiError::DatabaseError(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("'{0}' is not a valid order number")]
    InvalidOrderNumber(String),
    #[error("Order {0} has already been uploaded by another user")]
    OwnedByAnotherUser(OrderNumber),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
}

impl From<StorageError> for OrderFlowError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UserNotFound(id) => OrderFlowError::UserNotFound(id),
            other => OrderFlowError::DatabaseError(other.to_string()),
        }
    }
}
