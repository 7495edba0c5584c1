use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{OrderNumber, Points, Withdrawal},
    sqlite::db::users,
    traits::{is_unique_violation, StorageError},
};

/// Debits the user and records the withdrawal. This is not atomic on its own; run it inside a transaction.
pub async fn withdraw(
    user_id: i64,
    order: &OrderNumber,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, StorageError> {
    let balance = users::lock_user(user_id, conn).await?;
    if balance.current < amount {
        return Err(StorageError::InsufficientFunds { requested: amount, available: balance.current });
    }
    users::debit_balance(user_id, amount, conn).await?;
    let withdrawal: Withdrawal =
        sqlx::query_as("INSERT INTO withdrawals (user_id, order_number, amount) VALUES ($1, $2, $3) RETURNING *")
            .bind(user_id)
            .bind(order.as_str())
            .bind(amount)
            .fetch_one(conn)
            .await
            .map_err(|e| match is_unique_violation(&e) {
                true => StorageError::DuplicateWithdrawal(order.clone()),
                false => e.into(),
            })?;
    debug!("💸️ User #{user_id} withdrew {amount} against order [{order}]. Balance was {}", balance.current);
    Ok(withdrawal)
}

pub async fn fetch_withdrawals_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, sqlx::Error> {
    let withdrawals = sqlx::query_as("SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY processed_at, id")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(withdrawals)
}
