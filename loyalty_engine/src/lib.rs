//! Loyalty Engine
//!
//! The loyalty engine keeps users' loyalty point balances in step with an external accrual service. Users upload
//! order numbers; the accrual service decides, in its own time, whether each order earns points. This library polls
//! the service for every unresolved order and credits the points exactly once, when an order reaches its final state.
//!
//! The library is divided into these sections:
//! 1. Storage role interfaces ([`mod@traits`]) and their SQLite implementation ([`SqliteDatabase`]). The data types
//!    used in the database are defined in [`mod@db_types`] and are public.
//! 2. The accrual service client ([`mod@accrual`]).
//! 3. The synchronization pipeline ([`mod@pipeline`]) that connects the two.
//! 4. The account and order APIs ([`AccountApi`], [`OrderFlowApi`]) used by the user-facing request layer. Withdrawals
//!    go through here and share the pipeline's row locks, so credits and debits for the same user never interleave.
mod api;

pub mod accrual;
pub mod db_types;
pub mod pipeline;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(test)]
mod mocks;

pub use api::{
    accounts_api::AccountApi,
    errors::{AccountApiError, OrderFlowError},
    order_flow_api::{OrderFlowApi, SubmitOrderResult},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{AccountManagement, AccrualLedger, InsertOrderResult, LedgerTransaction, PendingOrders, StorageError};
