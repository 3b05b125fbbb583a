//! Payment processor client.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Configuration for connecting to the payment processor.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// Processor API base, e.g. `"https://api.processor.example"`.
    pub addr: String,

    /// Secret API key sent as a bearer token.
    pub api_key: String,
}

/// An intent created against the processor. The id is opaque; the
/// card and method details never pass through this system.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
}

/// Outcome of confirming an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded,
    Declined(String),
}

#[automock]
#[async_trait]
pub trait PaymentsClient: Send + Sync {
    /// Create an intent for `amount` minor units of `currency`.
    async fn create_intent(
        &self,
        amount: u64,
        currency: String,
    ) -> Result<PaymentIntent, PaymentsError>;

    /// Confirm a previously created intent.
    async fn confirm_intent(&self, intent_id: String) -> Result<PaymentOutcome, PaymentsError>;
}

/// HTTP implementation of [`PaymentsClient`].
#[derive(Debug, Clone)]
pub struct HttpPaymentsClient {
    config: PaymentsConfig,
    http: Client,
}

impl HttpPaymentsClient {
    #[must_use]
    pub fn new(config: PaymentsConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl PaymentsClient for HttpPaymentsClient {
    async fn create_intent(
        &self,
        amount: u64,
        currency: String,
    ) -> Result<PaymentIntent, PaymentsError> {
        let url = format!("{}/v1/payment_intents", self.config.addr);

        let body = serde_json::json!({ "amount": amount, "currency": currency });

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

            return Err(PaymentsError::UnexpectedResponse(format!(
                "create intent failed with status {status}: {text}"
            )));
        }

        let parsed: IntentResponse = response.json().await?;

        Ok(PaymentIntent {
            id: parsed.id,
            status: parsed.status,
        })
    }

    async fn confirm_intent(&self, intent_id: String) -> Result<PaymentOutcome, PaymentsError> {
        let url = format!(
            "{}/v1/payment_intents/{intent_id}/confirm",
            self.config.addr
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(PaymentsError::UnexpectedResponse(format!(
                "confirm intent failed with status {status}: {text}"
            )));
        }

        let parsed: IntentResponse = response.json().await?;

        match parsed.status.as_str() {
            "succeeded" => Ok(PaymentOutcome::Succeeded),
            _ => Ok(PaymentOutcome::Declined(
                parsed
                    .last_error_message
                    .unwrap_or_else(|| format!("intent status {}", parsed.status)),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    status: String,
    last_error_message: Option<String>,
}

/// Errors that can occur when communicating with the processor.
#[derive(Debug, Error)]
pub enum PaymentsError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor returned a non-2xx response or unexpected body.
    #[error("unexpected response from payment processor: {0}")]
    UnexpectedResponse(String),
}
