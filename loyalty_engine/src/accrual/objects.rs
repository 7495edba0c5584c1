use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::db_types::{OrderStatus, Points};

/// Order status as reported by the accrual service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    /// The service knows the order but has not started on it.
    #[serde(alias = "NEW")]
    Registered,
    Processing,
    Invalid,
    Processed,
}

impl AccrualStatus {
    /// The order status this maps to locally. A registered order is already being handled by the service, so it moves
    /// to PROCESSING. No mapping ever leads back to NEW.
    pub fn order_status(&self) -> OrderStatus {
        match self {
            AccrualStatus::Registered | AccrualStatus::Processing => OrderStatus::Processing,
            AccrualStatus::Invalid => OrderStatus::Invalid,
            AccrualStatus::Processed => OrderStatus::Processed,
        }
    }
}

/// The body of a successful `GET /api/orders/{number}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualRecord {
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualReply {
    /// 200: the service has a record for the order.
    Registered(AccrualRecord),
    /// 204: the service has never heard of the order.
    NotRegistered,
    /// 429: the caller must back off. `retry_after` is `None` if the header was missing or unreadable.
    TooManyRequests { retry_after: Option<Duration> },
    /// Any other status code.
    Unexpected { status: u16 },
}
