//! `SqliteDatabase` is the concrete SQLite implementation of the loyalty engine backend.
//!
//! It implements every trait in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::{
    db::{new_pool, orders, users, withdrawals},
    ledger::SqliteLedgerTx,
};
use crate::{
    db_types::{Order, OrderNumber, Points, UserAccount, Withdrawal},
    traits::{AccountManagement, AccrualLedger, InsertOrderResult, PendingOrders, StorageError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url`. The database must already exist.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {e}")))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl PendingOrders for SqliteDatabase {
    async fn fetch_pending_order_numbers(&self) -> Result<Vec<OrderNumber>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let numbers = orders::fetch_pending_order_numbers(&mut conn).await?;
        Ok(numbers)
    }
}

impl AccrualLedger for SqliteDatabase {
    type Tx = SqliteLedgerTx;

    async fn begin(&self) -> Result<Self::Tx, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(SqliteLedgerTx::new(tx))
    }
}

impl AccountManagement for SqliteDatabase {
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<UserAccount, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(login, password_hash, &mut conn).await
    }

    async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::user_by_id(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<UserAccount>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::user_by_login(login, &mut conn).await?;
        Ok(user)
    }

    async fn insert_order(&self, user_id: i64, number: &OrderNumber) -> Result<InsertOrderResult, StorageError> {
        let mut conn = self.pool.acquire().await?;
        if users::user_by_id(user_id, &mut conn).await?.is_none() {
            return Err(StorageError::UserNotFound(user_id));
        }
        orders::idempotent_insert(user_id, number, &mut conn).await
    }

    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn withdraw(&self, user_id: i64, order: &OrderNumber, amount: Points) -> Result<Withdrawal, StorageError> {
        let mut tx = self.pool.begin().await?;
        let withdrawal = withdrawals::withdraw(user_id, order, amount, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Withdrawal #{} committed for user #{user_id}", withdrawal.id);
        Ok(withdrawal)
    }

    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let withdrawals = withdrawals::fetch_withdrawals_for_user(user_id, &mut conn).await?;
        Ok(withdrawals)
    }
}
