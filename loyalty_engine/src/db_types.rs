use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
pub use loyalty_common::Points;
use loyalty_common::is_luhn_valid;
use serde::Serialize;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------     OrderNumber       ---------------------------------------------------------
/// An order number. Numbers entering the system through [`OrderNumber::from_str`] are checked with the Luhn algorithm.
/// Numbers read back from the database were validated on the way in and are not checked again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl FromStr for OrderNumber {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if is_luhn_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ConversionError(format!("{s} is not a valid order number")))
        }
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

//--------------------------------------     OrderStatus       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// The order has been uploaded but not yet seen by the accrual service.
    New,
    /// The accrual service knows about the order and is still evaluating it.
    Processing,
    /// The accrual service rejected the order, or has never heard of it. Terminal.
    Invalid,
    /// The accrual has been calculated and credited. Terminal.
    Processed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Invalid | OrderStatus::Processed)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::Processing => write!(f, "PROCESSING"),
            OrderStatus::Invalid => write!(f, "INVALID"),
            OrderStatus::Processed => write!(f, "PROCESSED"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to NEW");
            OrderStatus::New
        })
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub number: OrderNumber,
    pub user_id: i64,
    pub status: OrderStatus,
    pub accrual: Points,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     UserAccount       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub balance: Points,
    pub withdrawn: Points,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A snapshot of a user's spendable balance and lifetime withdrawals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct Balance {
    #[sqlx(rename = "balance")]
    #[serde(rename = "current")]
    pub current: Points,
    pub withdrawn: Points,
}

impl From<&UserAccount> for Balance {
    fn from(account: &UserAccount) -> Self {
        Self { current: account.balance, withdrawn: account.withdrawn }
    }
}

//--------------------------------------     Withdrawal        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Withdrawal {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    #[serde(rename = "order")]
    pub order_number: OrderNumber,
    #[serde(rename = "sum")]
    pub amount: Points,
    pub processed_at: DateTime<Utc>,
}

//--------------------------------------    AccrualResult      ---------------------------------------------------------
/// The resolved outcome of asking the accrual service about an order, ready to be applied to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualResult {
    pub order: OrderNumber,
    pub status: OrderStatus,
    pub accrual: Points,
}

impl AccrualResult {
    pub fn new(order: OrderNumber, status: OrderStatus, accrual: Points) -> Self {
        Self { order, status, accrual }
    }

    /// An INVALID outcome with no accrual.
    pub fn invalid(order: OrderNumber) -> Self {
        Self { order, status: OrderStatus::Invalid, accrual: Points::zero() }
    }
}

impl Display for AccrualResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} ({} points)", self.order, self.status, self.accrual)
    }
}
