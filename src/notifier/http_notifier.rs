use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::app::{FeedhookError, Result};
use crate::domain::Item;
use crate::fetcher::http_fetcher::USER_AGENT;
use crate::notifier::{Delivery, Notifier};

pub struct HttpNotifier {
    client: Client,
}

impl HttpNotifier {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, hook_url: &str, item: &Item) -> Result<Delivery> {
        let payload = serde_json::to_vec(item)?;

        let delivery_error = |source: reqwest::Error| FeedhookError::Delivery {
            hook: hook_url.to_string(),
            source,
        };

        let response = self
            .client
            .post(hook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(delivery_error)?;

        let status = response.status();
        // The reply carries nothing we use, but it must be drained.
        response.bytes().await.map_err(delivery_error)?;

        let delivery = Delivery {
            status: status.as_u16(),
        };
        if !delivery.acknowledged() {
            tracing::warn!("Hook {} answered with status {}", hook_url, status);
        }

        Ok(delivery)
    }
}
