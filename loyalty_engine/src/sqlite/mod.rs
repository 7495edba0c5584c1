//! SQLite backend for the loyalty engine.
mod ledger;
mod sqlite_impl;

pub mod db;
pub use ledger::SqliteLedgerTx;
pub use sqlite_impl::SqliteDatabase;
