//! Commerce platform client.
//!
//! Orders paid for here are mirrored into a hosted commerce platform
//! that owns fulfillment. The platform knows products by variant id,
//! so each line carries the mapped external variant rather than our
//! product uuid.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for connecting to the commerce platform.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Store API base, e.g. `"https://store.example.com/admin/api"`.
    pub addr: String,

    /// Private app access token.
    pub access_token: String,
}

/// Shipping destination as the platform expects it.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalAddress {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// One order line, in platform terms.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalLineItem {
    pub variant_id: String,
    pub quantity: u32,
}

/// The order payload mirrored to the platform. The phone must already
/// be in E.164 form; the platform rejects anything else.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalOrder {
    pub email: String,
    pub phone: String,
    pub shipping_address: ExternalAddress,
    pub line_items: Vec<ExternalLineItem>,
}

#[automock]
#[async_trait]
pub trait CommerceClient: Send + Sync {
    /// Create the order on the platform, returning its external id.
    async fn create_order(&self, order: ExternalOrder) -> Result<String, CommerceError>;
}

/// HTTP implementation of [`CommerceClient`].
#[derive(Debug, Clone)]
pub struct HttpCommerceClient {
    config: CommerceConfig,
    http: Client,
}

impl HttpCommerceClient {
    #[must_use]
    pub fn new(config: CommerceConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl CommerceClient for HttpCommerceClient {
    async fn create_order(&self, order: ExternalOrder) -> Result<String, CommerceError> {
        let url = format!("{}/orders.json", self.config.addr);

        let body = serde_json::json!({ "order": order });

        let response = self
            .http
            .post(&url)
            .header("X-Access-Token", &self.config.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(CommerceError::UnexpectedResponse(format!(
                "create order failed with status {status}: {text}"
            )));
        }

        let parsed: CreateOrderResponse = response.json().await?;

        Ok(parsed.order.id)
    }
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    order: CreatedOrder,
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
    id: String,
}

/// Errors that can occur when communicating with the platform.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform returned a non-2xx response or unexpected body.
    #[error("unexpected response from commerce platform: {0}")]
    UnexpectedResponse(String),
}
