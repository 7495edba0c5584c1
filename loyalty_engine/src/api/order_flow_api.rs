//! Order uploads and order history.
use std::fmt::Debug;

use log::*;

use super::errors::OrderFlowError;
use crate::{
    db_types::{Order, OrderNumber},
    traits::{AccountManagement, InsertOrderResult},
};

/// The outcome of a successful upload.
#[derive(Debug, Clone)]
pub enum SubmitOrderResult {
    /// The order is new and will be picked up by the accrual pipeline.
    Accepted(Order),
    /// The same user uploaded this order before. Nothing changed.
    AlreadySubmitted(Order),
}

pub struct OrderFlowApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Accepts an order number uploaded by a user.
    ///
    /// The number must pass the Luhn check. Uploading a number that another user already owns is an error; uploading
    /// one's own number again is not.
    pub async fn submit_order(&self, user_id: i64, number: &str) -> Result<SubmitOrderResult, OrderFlowError> {
        let number =
            number.parse::<OrderNumber>().map_err(|_| OrderFlowError::InvalidOrderNumber(number.to_string()))?;
        match self.db.insert_order(user_id, &number).await? {
            InsertOrderResult::Inserted(order) => {
                info!("📦️ User #{user_id} uploaded order [{number}]");
                Ok(SubmitOrderResult::Accepted(order))
            },
            InsertOrderResult::AlreadyExists(order) if order.user_id == user_id => {
                debug!("📦️ User #{user_id} re-uploaded order [{number}]");
                Ok(SubmitOrderResult::AlreadySubmitted(order))
            },
            InsertOrderResult::AlreadyExists(order) => {
                warn!("📦️ User #{user_id} tried to upload order [{number}], which belongs to user #{}", order.user_id);
                Err(OrderFlowError::OwnedByAnotherUser(number))
            },
        }
    }

    /// The user's orders, oldest upload first.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        trace!("📦️ User #{user_id} has {} orders", orders.len());
        Ok(orders)
    }
}
