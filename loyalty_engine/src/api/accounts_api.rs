//! User accounts, balances and withdrawals.
use std::fmt::Debug;

use log::*;

use super::errors::AccountApiError;
use crate::{
    db_types::{Balance, OrderNumber, Points, UserAccount, Withdrawal},
    traits::AccountManagement,
};

/// The `AccountApi` provides a unified API for accessing user accounts.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Creates a user. Password hashing is the caller's concern; the hash is stored verbatim.
    pub async fn register_user(&self, login: &str, password_hash: &str) -> Result<UserAccount, AccountApiError> {
        let user = self.db.create_user(login, password_hash).await?;
        info!("👤️ Registered user #{} ({login})", user.id);
        Ok(user)
    }

    pub async fn user_by_login(&self, login: &str) -> Result<Option<UserAccount>, AccountApiError> {
        Ok(self.db.fetch_user_by_login(login).await?)
    }

    pub async fn balance(&self, user_id: i64) -> Result<Balance, AccountApiError> {
        let user = self.db.fetch_user_account(user_id).await?.ok_or(AccountApiError::UserNotFound(user_id))?;
        Ok(Balance::from(&user))
    }

    /// Spends `sum` points against `order`. The order number must pass the Luhn check, but need not be one of the
    /// user's uploaded orders.
    pub async fn withdraw(&self, user_id: i64, order: &str, sum: Points) -> Result<Withdrawal, AccountApiError> {
        let order = order.parse::<OrderNumber>().map_err(|_| AccountApiError::InvalidOrderNumber(order.to_string()))?;
        if !sum.is_positive() {
            return Err(AccountApiError::InvalidAmount(sum));
        }
        let withdrawal = self.db.withdraw(user_id, &order, sum).await?;
        info!("💸️ User #{user_id} withdrew {sum} points against order [{order}]");
        Ok(withdrawal)
    }

    /// The user's withdrawals, oldest first.
    pub async fn withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError> {
        Ok(self.db.fetch_withdrawals_for_user(user_id).await?)
    }
}
