use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderNumber, OrderStatus, Points},
    traits::{is_unique_violation, InsertOrderResult, StorageError},
};

/// Inserts a NEW order for the user, unless an order with the same number already exists. In that case the existing
/// order is returned unchanged, whoever owns it.
pub async fn idempotent_insert(
    user_id: i64,
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, StorageError> {
    if let Some(existing) = fetch_order(number, conn).await? {
        trace!("📝️ Order [{number}] already exists and belongs to user #{}", existing.user_id);
        return Ok(InsertOrderResult::AlreadyExists(existing));
    }
    let inserted: Result<Order, sqlx::Error> =
        sqlx::query_as("INSERT INTO orders (number, user_id) VALUES ($1, $2) RETURNING *")
            .bind(number.as_str())
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await;
    match inserted {
        Ok(order) => {
            debug!("📝️ Order [{number}] uploaded by user #{user_id}");
            Ok(InsertOrderResult::Inserted(order))
        },
        // Lost a race with a concurrent upload of the same number
        Err(e) if is_unique_violation(&e) => match fetch_order(number, conn).await? {
            Some(existing) => Ok(InsertOrderResult::AlreadyExists(existing)),
            None => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE number = $1").bind(number.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY uploaded_at, rowid")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Numbers of all orders that are still waiting on the accrual service, oldest first.
pub async fn fetch_pending_order_numbers(conn: &mut SqliteConnection) -> Result<Vec<OrderNumber>, sqlx::Error> {
    let numbers = sqlx::query_scalar(
        "SELECT number FROM orders WHERE status IN ('NEW', 'PROCESSING') ORDER BY uploaded_at, rowid",
    )
    .fetch_all(conn)
    .await?;
    Ok(numbers)
}

/// Locks the order row for the rest of the transaction and returns the owning user's id.
pub async fn lock_order_owner(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<i64, StorageError> {
    let user_id: Option<i64> =
        sqlx::query_scalar("UPDATE orders SET updated_at = updated_at WHERE number = $1 RETURNING user_id")
            .bind(number.as_str())
            .fetch_optional(conn)
            .await?;
    user_id.ok_or_else(|| StorageError::OrderNotFound(number.clone()))
}

/// Records the accrual outcome. Only orders in the NEW or PROCESSING state are updated.
pub async fn set_outcome(
    number: &OrderNumber,
    status: OrderStatus,
    accrual: Points,
    conn: &mut SqliteConnection,
) -> Result<(), StorageError> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET status = $1, accrual = $2, updated_at = CURRENT_TIMESTAMP
            WHERE number = $3 AND status IN ('NEW', 'PROCESSING')
        "#,
    )
    .bind(status.to_string())
    .bind(accrual)
    .bind(number.as_str())
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StorageError::OrderAlreadyFinal(number.clone()));
    }
    trace!("📝️ Order [{number}] is now {status} with accrual {accrual}");
    Ok(())
}
