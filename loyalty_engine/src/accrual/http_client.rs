use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderValue, RETRY_AFTER},
    Client,
    StatusCode,
};

use super::{AccrualClient, AccrualClientError, AccrualRecord, AccrualReply};
use crate::db_types::OrderNumber;

/// Talks to the accrual service over HTTP.
#[derive(Clone)]
pub struct HttpAccrualClient {
    base_url: String,
    client: Arc<Client>,
}

impl HttpAccrualClient {
    /// `base_url` is the scheme and authority of the accrual service, e.g. `http://accrual:8080`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AccrualClientError> {
        let client =
            Client::builder().timeout(timeout).build().map_err(|e| AccrualClientError::Initialization(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { base_url, client: Arc::new(client) })
    }

    pub fn url(&self, order: &OrderNumber) -> String {
        format!("{}/api/orders/{order}", self.base_url)
    }
}

impl AccrualClient for HttpAccrualClient {
    async fn fetch_accrual(&self, order: &OrderNumber) -> Result<AccrualReply, AccrualClientError> {
        let url = self.url(order);
        trace!("🧮️ GET {url}");
        let response =
            self.client.get(url.as_str()).send().await.map_err(|e| AccrualClientError::RequestFailed(e.to_string()))?;
        let status = response.status();
        trace!("🧮️ Accrual service replied {status} for [{order}]");
        let reply = match status {
            StatusCode::OK => {
                let record = response
                    .json::<AccrualRecord>()
                    .await
                    .map_err(|e| AccrualClientError::InvalidBody(e.to_string()))?;
                AccrualReply::Registered(record)
            },
            StatusCode::NO_CONTENT => AccrualReply::NotRegistered,
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response.headers().get(RETRY_AFTER).and_then(parse_retry_after);
                AccrualReply::TooManyRequests { retry_after }
            },
            other => AccrualReply::Unexpected { status: other.as_u16() },
        };
        Ok(reply)
    }
}

/// Longest back-off the accrual service can ask for. Larger `Retry-After` values are clamped to this.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Reads a `Retry-After` header given in whole seconds. HTTP-date values and garbage yield `None`.
pub fn parse_retry_after(value: &HeaderValue) -> Option<Duration> {
    let secs = value.to_str().ok()?.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}
