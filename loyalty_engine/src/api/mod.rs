//! # Loyalty engine public API
//!
//! These APIs back the user-facing request layer. An API instance is created by supplying a database backend that
//! implements the backend traits it needs:
//!
//! ```rust,ignore
//! use loyalty_engine::{AccountApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = AccountApi::new(db);
//! let balance = api.balance(user_id).await?;
//! ```
//!
//! * [`accounts_api`] registers users and manages balances and withdrawals.
//! * [`order_flow_api`] accepts order uploads and lists a user's orders.
pub mod accounts_api;
pub mod errors;
pub mod order_flow_api;
