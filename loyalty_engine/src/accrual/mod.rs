//! # Accrual service client
//!
//! The accrual service is the external system that decides whether an order earns points and how many.
//! [`AccrualClient`] is the seam the pipeline depends on; [`HttpAccrualClient`] is the production implementation.
mod http_client;
mod objects;

pub use http_client::{parse_retry_after, HttpAccrualClient, MAX_RETRY_AFTER};
pub use objects::{AccrualRecord, AccrualReply, AccrualStatus};
use thiserror::Error;

use crate::db_types::OrderNumber;

#[derive(Debug, Clone, Error)]
pub enum AccrualClientError {
    #[error("Could not initialize the accrual client: {0}")]
    Initialization(String),
    #[error("Request to the accrual service failed: {0}")]
    RequestFailed(String),
    #[error("The accrual service returned a malformed body: {0}")]
    InvalidBody(String),
}

/// Asks the accrual service about one order.
///
/// Implementations only translate the transport into an [`AccrualReply`]. Deciding what a reply means for the order
/// is left to the caller.
#[allow(async_fn_in_trait)]
pub trait AccrualClient {
    async fn fetch_accrual(&self, order: &OrderNumber) -> Result<AccrualReply, AccrualClientError>;
}
