use loyalty_engine::{
    db_types::{AccrualResult, Balance, OrderNumber, OrderStatus, Points},
    pipeline::BalanceUpdater,
    AccountManagement,
    AccrualLedger,
    LedgerTransaction,
    PendingOrders,
    SqliteDatabase,
    StorageError,
};
use tokio::sync::mpsc;

mod support;
use support::prepare_env::*;

fn updater(db: &SqliteDatabase) -> BalanceUpdater<SqliteDatabase> {
    let (_, rx) = mpsc::channel(1);
    BalanceUpdater::new(db.clone(), rx)
}

#[tokio::test]
async fn processed_order_credits_its_owner() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    let order = new_order(&db, alice, "12345678903").await;

    let result = AccrualResult::new(order.clone(), OrderStatus::Processed, Points::from_points(500));
    updater(&db).apply(&result).await.unwrap();

    let stored = db.fetch_order(&order).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Processed);
    assert_eq!(stored.accrual, Points::from_points(500));
    assert_eq!(balance_of(&db, alice).await, Points::from_points(500));
}

#[tokio::test]
async fn credits_only_touch_the_owner() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    let bob = new_user(&db, "bob").await;
    set_balance(&db, bob, Points::from_points(7)).await;
    let order = new_order(&db, alice, "79927398713").await;

    let result = AccrualResult::new(order, OrderStatus::Processed, Points::from_cents(1050));
    updater(&db).apply(&result).await.unwrap();

    assert_eq!(balance_of(&db, alice).await, Points::from_cents(1050));
    assert_eq!(balance_of(&db, bob).await, Points::from_points(7));
}

#[tokio::test]
async fn invalid_order_leaves_the_balance_alone() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    set_balance(&db, alice, Points::from_points(20)).await;
    let order = new_order(&db, alice, "12345678903").await;

    updater(&db).apply(&AccrualResult::invalid(order.clone())).await.unwrap();

    let stored = db.fetch_order(&order).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Invalid);
    assert_eq!(stored.accrual, Points::zero());
    assert_eq!(balance_of(&db, alice).await, Points::from_points(20));
}

#[tokio::test]
async fn processing_order_stays_pending() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    let order = new_order(&db, alice, "12345678903").await;

    let result = AccrualResult::new(order.clone(), OrderStatus::Processing, Points::zero());
    updater(&db).apply(&result).await.unwrap();
    // Applying the same non-terminal outcome again is harmless
    updater(&db).apply(&result).await.unwrap();

    assert_eq!(status_of(&db, &order).await, OrderStatus::Processing);
    assert_eq!(db.fetch_pending_order_numbers().await.unwrap(), vec![order]);
}

#[tokio::test]
async fn terminal_orders_are_never_credited_twice() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    let order = new_order(&db, alice, "12345678903").await;
    let result = AccrualResult::new(order.clone(), OrderStatus::Processed, Points::from_points(500));
    let updater = updater(&db);

    updater.apply(&result).await.unwrap();
    let err = updater.apply(&result).await.unwrap_err();
    assert!(matches!(err, StorageError::OrderAlreadyFinal(n) if n == order));
    let err = updater.apply(&AccrualResult::invalid(order.clone())).await.unwrap_err();
    assert!(matches!(err, StorageError::OrderAlreadyFinal(_)));

    assert_eq!(status_of(&db, &order).await, OrderStatus::Processed);
    assert_eq!(balance_of(&db, alice).await, Points::from_points(500));
    assert!(db.fetch_pending_order_numbers().await.unwrap().is_empty());
}

#[tokio::test]
async fn pending_orders_come_back_oldest_first() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    let numbers = ["12345678903", "79927398713", "4561261212345467", "2377225624"];
    for n in numbers {
        new_order(&db, alice, n).await;
    }
    let done: OrderNumber = "79927398713".parse().unwrap();
    updater(&db).apply(&AccrualResult::invalid(done)).await.unwrap();

    let pending = db.fetch_pending_order_numbers().await.unwrap();
    let pending: Vec<&str> = pending.iter().map(|n| n.as_str()).collect();
    assert_eq!(pending, vec!["12345678903", "4561261212345467", "2377225624"]);
}

#[tokio::test]
async fn unknown_order_is_an_error() {
    let db = prepare_test_env(&random_db_path()).await;
    let ghost: OrderNumber = "12345678903".parse().unwrap();
    let err = updater(&db).apply(&AccrualResult::invalid(ghost)).await.unwrap_err();
    assert!(matches!(err, StorageError::OrderNotFound(_)));
}

/// A ledger whose transactions blow up right after the order status has been written.
#[derive(Clone)]
struct FailingLedger(SqliteDatabase);

struct FailingTx(<SqliteDatabase as AccrualLedger>::Tx);

impl AccrualLedger for FailingLedger {
    type Tx = FailingTx;

    async fn begin(&self) -> Result<Self::Tx, StorageError> {
        Ok(FailingTx(self.0.begin().await?))
    }
}

impl LedgerTransaction for FailingTx {
    async fn lock_order_owner(&mut self, order: &OrderNumber) -> Result<i64, StorageError> {
        self.0.lock_order_owner(order).await
    }

    async fn lock_balance(&mut self, user_id: i64) -> Result<Balance, StorageError> {
        self.0.lock_balance(user_id).await
    }

    async fn set_order_outcome(
        &mut self,
        order: &OrderNumber,
        status: OrderStatus,
        accrual: Points,
    ) -> Result<(), StorageError> {
        self.0.set_order_outcome(order, status, accrual).await
    }

    async fn increment_balance(&mut self, _user_id: i64, _delta: Points) -> Result<(), StorageError> {
        Err(StorageError::DatabaseError("simulated crash".into()))
    }

    async fn commit(self) -> Result<(), StorageError> {
        self.0.commit().await
    }

    async fn rollback(self) -> Result<(), StorageError> {
        self.0.rollback().await
    }
}

#[tokio::test]
async fn failed_credit_rolls_back_the_status_change() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    let order = new_order(&db, alice, "12345678903").await;
    let (_, rx) = mpsc::channel(1);
    let updater = BalanceUpdater::new(FailingLedger(db.clone()), rx);

    let result = AccrualResult::new(order.clone(), OrderStatus::Processed, Points::from_points(500));
    assert!(updater.apply(&result).await.is_err());

    assert_eq!(status_of(&db, &order).await, OrderStatus::New);
    assert_eq!(balance_of(&db, alice).await, Points::zero());
    assert_eq!(db.fetch_pending_order_numbers().await.unwrap(), vec![order.clone()]);

    // Once storage recovers, the retry goes through
    crate::updater(&db).apply(&result).await.unwrap();
    assert_eq!(balance_of(&db, alice).await, Points::from_points(500));
}

#[tokio::test]
async fn dropped_transaction_leaves_no_trace() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    let order = new_order(&db, alice, "12345678903").await;
    {
        let mut tx = db.begin().await.unwrap();
        let owner = tx.lock_order_owner(&order).await.unwrap();
        assert_eq!(owner, alice);
        tx.set_order_outcome(&order, OrderStatus::Processed, Points::from_points(9)).await.unwrap();
        tx.increment_balance(owner, Points::from_points(9)).await.unwrap();
        // dropped without commit
    }
    assert_eq!(status_of(&db, &order).await, OrderStatus::New);
    assert_eq!(balance_of(&db, alice).await, Points::zero());
}

#[tokio::test]
async fn credit_that_would_overflow_the_balance_is_refused() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    let near_max = Points::from_cents(i64::MAX - 5);
    set_balance(&db, alice, near_max).await;
    let order = new_order(&db, alice, "12345678903").await;

    let result = AccrualResult::new(order.clone(), OrderStatus::Processed, Points::from_cents(10));
    let err = updater(&db).apply(&result).await.unwrap_err();
    assert!(matches!(err, StorageError::BalanceOverflow { .. }));
    assert_eq!(status_of(&db, &order).await, OrderStatus::New);
    assert_eq!(balance_of(&db, alice).await, near_max);
}

#[tokio::test]
async fn balance_column_rejects_integer_overflow() {
    let db = prepare_test_env(&random_db_path()).await;
    let alice = new_user(&db, "alice").await;
    set_balance(&db, alice, Points::from_cents(i64::MAX - 5)).await;

    let mut tx = db.begin().await.unwrap();
    tx.lock_balance(alice).await.unwrap();
    // SQLite would silently turn the sum into a REAL. The column CHECK refuses it.
    let err = tx.increment_balance(alice, Points::from_cents(10)).await.unwrap_err();
    assert!(matches!(err, StorageError::DatabaseError(_)));
    tx.rollback().await.unwrap();
    assert_eq!(balance_of(&db, alice).await, Points::from_cents(i64::MAX - 5));
}
