//! Shipping rate client.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Configuration for connecting to the rate service.
#[derive(Debug, Clone)]
pub struct ShippingConfig {
    /// Rate API base.
    pub addr: String,

    /// API key sent as a bearer token.
    pub api_key: String,
}

#[automock]
#[async_trait]
pub trait ShippingQuoter: Send + Sync {
    /// Quote shipping to a destination, in minor units.
    async fn quote(
        &self,
        zip: String,
        country: String,
        item_count: u32,
    ) -> Result<u64, ShippingError>;
}

/// HTTP implementation of [`ShippingQuoter`].
#[derive(Debug, Clone)]
pub struct HttpShippingQuoter {
    config: ShippingConfig,
    http: Client,
}

impl HttpShippingQuoter {
    #[must_use]
    pub fn new(config: ShippingConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ShippingQuoter for HttpShippingQuoter {
    async fn quote(
        &self,
        zip: String,
        country: String,
        item_count: u32,
    ) -> Result<u64, ShippingError> {
        let url = format!("{}/v1/rates", self.config.addr);

        let body = serde_json::json!({
            "destination": { "zip": zip, "country": country },
            "item_count": item_count,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ShippingError::UnexpectedResponse(format!(
                "rate request failed with status {status}: {text}"
            )));
        }

        let parsed: RateResponse = response.json().await?;

        Ok(parsed.amount)
    }
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    amount: u64,
}

/// Errors that can occur when quoting shipping.
#[derive(Debug, Error)]
pub enum ShippingError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The rate service returned a non-2xx response or unexpected body.
    #[error("unexpected response from rate service: {0}")]
    UnexpectedResponse(String),
}
