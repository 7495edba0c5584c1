//! # Storage role interfaces
//!
//! These traits define what the engine needs from a database backend. Each consumer depends only on the narrow role
//! it uses:
//!
//! * [`PendingOrders`] lets the order source discover orders that still need an accrual outcome.
//! * [`AccrualLedger`] and [`LedgerTransaction`] let the balance updater apply an outcome atomically.
//! * [`AccountManagement`] backs the user-facing account and order flows, including withdrawals.
mod accrual_ledger;
mod account_management;
mod errors;
mod pending_orders;

pub(crate) use errors::is_unique_violation;
pub use accrual_ledger::{AccrualLedger, LedgerTransaction};
pub use account_management::{AccountManagement, InsertOrderResult};
pub use errors::StorageError;
pub use pending_orders::PendingOrders;
