//! Stripe payment-intent client.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, instrument};

use bangaliana_core::CurrencyCode;

use crate::config::StripeConfig;

/// Errors returned by a payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("gateway request failed: {0}")]
    Request(String),

    /// Gateway answered with an error status.
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the gateway response.
    #[error("gateway response error: {0}")]
    Response(String),

    /// Intent was created but came back without a client secret.
    #[error("gateway response carried no client secret")]
    MissingClientSecret,
}

/// External boundary that turns an amount into a redeemable client secret.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for `amount` minor units of `currency`.
    async fn create_intent(
        &self,
        amount: i64,
        currency: CurrencyCode,
    ) -> Result<String, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Stripe `PaymentIntents` API client.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    secret_key: SecretString,
    endpoint: String,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("secret_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl StripeGateway {
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        let base = config.api_base.as_str().trim_end_matches('/');
        Self {
            client: Client::new(),
            secret_key: config.secret_key.clone(),
            endpoint: format!("{base}/v1/payment_intents"),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self))]
    async fn create_intent(
        &self,
        amount: i64,
        currency: CurrencyCode,
    ) -> Result<String, GatewayError> {
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency.as_str()),
            ("payment_method_types[]", "card"),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            error!(status = status.as_u16(), message = %message, "Stripe rejected payment intent");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let intent: IntentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Response(e.to_string()))?;

        debug!("Payment intent created");
        intent.client_secret.ok_or(GatewayError::MissingClientSecret)
    }
}
