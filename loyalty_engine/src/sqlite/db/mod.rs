//! # SQLite database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All of these are simple functions that accept a `&mut SqliteConnection` argument. Callers can obtain a connection
//! from a pool, or open a transaction and pass `&mut tx` without any other changes.
//!
//! SQLite has no `SELECT ... FOR UPDATE`. Instead, the `lock_*` functions issue a no-op `UPDATE ... RETURNING` against
//! the row. Inside a transaction the first write takes the database write lock, which is then held until the
//! transaction commits or rolls back. Every writer that locks a user row therefore serializes with every other.
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Error as SqlxError, Sqlite, SqlitePool};

pub mod orders;
pub mod users;
pub mod withdrawals;

pub const SQLITE_DB_URL: &str = "sqlite://data/loyalty.db";

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    info!("🗃️ Opening SQLite pool at {url} with up to {max_connections} connections");
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Creates an empty database at `url` unless one is already there. Returns true if a new database was created.
pub async fn create_database_if_missing(url: &str) -> Result<bool, SqlxError> {
    if Sqlite::database_exists(url).await? {
        return Ok(false);
    }
    info!("🗃️ Creating new database at {url}");
    Sqlite::create_database(url).await?;
    Ok(true)
}
