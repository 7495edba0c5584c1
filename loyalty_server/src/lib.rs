//! # Loyalty accrual server
//!
//! Runs the accrual synchronization pipeline against a SQLite database until it receives Ctrl-C:
//! pending orders are picked up from storage, their outcome is fetched from the accrual service, and the points
//! earned are credited to their owners.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod cli;
pub mod config;
pub mod errors;
pub mod server;
