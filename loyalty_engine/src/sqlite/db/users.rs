use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Balance, Points, UserAccount},
    traits::{is_unique_violation, StorageError},
};

pub async fn insert_user(
    login: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<UserAccount, StorageError> {
    let user: UserAccount = sqlx::query_as("INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING *")
        .bind(login)
        .bind(password_hash)
        .fetch_one(conn)
        .await
        .map_err(|e| if is_unique_violation(&e) { StorageError::LoginTaken(login.to_string()) } else { e.into() })?;
    debug!("👤️ Created user #{} ({login})", user.id);
    Ok(user)
}

pub async fn user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn user_by_login(login: &str, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE login = $1").bind(login).fetch_optional(conn).await?;
    Ok(user)
}

/// Locks the user row for the rest of the transaction and returns the balance under the lock.
///
/// Both the accrual credit path and the withdrawal path go through here.
pub async fn lock_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Balance, StorageError> {
    let balance: Option<Balance> =
        sqlx::query_as("UPDATE users SET updated_at = updated_at WHERE id = $1 RETURNING balance, withdrawn")
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    balance.ok_or(StorageError::UserNotFound(user_id))
}

pub async fn increment_balance(user_id: i64, delta: Points, conn: &mut SqliteConnection) -> Result<(), StorageError> {
    let result =
        sqlx::query("UPDATE users SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
            .bind(delta)
            .bind(user_id)
            .execute(conn)
            .await?;
    if result.rows_affected() == 0 {
        return Err(StorageError::UserNotFound(user_id));
    }
    Ok(())
}

/// Moves `amount` from the balance to the withdrawn total. The caller must already hold the user lock and have
/// checked that the balance covers the amount.
pub async fn debit_balance(user_id: i64, amount: Points, conn: &mut SqliteConnection) -> Result<(), StorageError> {
    let result = sqlx::query(
        r#"
            UPDATE users SET
                balance = balance - $1,
                withdrawn = withdrawn + $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StorageError::UserNotFound(user_id));
    }
    Ok(())
}
