use log::*;
use loyalty_engine::{
    db_types::{OrderNumber, OrderStatus, Points},
    AccountManagement,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Creates a fresh, migrated database at `url` and returns a handle to it.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("loyalty_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("Could not drop database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

/// Appends a Luhn check digit to `seed`.
pub fn luhn_number(seed: u64) -> String {
    let digits = seed.to_string();
    for check in 0..10 {
        let candidate = format!("{digits}{check}");
        if candidate.parse::<OrderNumber>().is_ok() {
            return candidate;
        }
    }
    unreachable!("one of ten check digits always works")
}

pub async fn new_user(db: &SqliteDatabase, login: &str) -> i64 {
    db.create_user(login, "$argon2id$not-a-real-hash").await.expect("Error creating user").id
}

pub async fn new_order(db: &SqliteDatabase, user_id: i64, number: &str) -> OrderNumber {
    let number: OrderNumber = number.parse().expect("Invalid order number");
    db.insert_order(user_id, &number).await.expect("Error inserting order");
    number
}

pub async fn set_balance(db: &SqliteDatabase, user_id: i64, balance: Points) {
    sqlx::query("UPDATE users SET balance = $1 WHERE id = $2")
        .bind(balance)
        .bind(user_id)
        .execute(db.pool())
        .await
        .expect("Error setting balance");
}

pub async fn balance_of(db: &SqliteDatabase, user_id: i64) -> Points {
    db.fetch_user_account(user_id).await.unwrap().expect("No such user").balance
}

pub async fn status_of(db: &SqliteDatabase, number: &OrderNumber) -> OrderStatus {
    db.fetch_order(number).await.unwrap().expect("No such order").status
}
