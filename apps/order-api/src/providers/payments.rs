//! Card payment intents via Stripe.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ApiError;

/// Creates payment intents the mobile app confirms client-side.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create an intent for `amount` (smallest currency unit) and return its
    /// client secret.
    async fn create_payment_intent(&self, amount: u64, currency: &str) -> Result<String, ApiError>;
}

#[derive(Clone)]
pub struct StripeClient {
    api_base: String,
    secret_key: Option<String>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(api_base: &str, secret_key: Option<String>, http: reqwest::Client) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
            http,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_payment_intent(&self, amount: u64, currency: &str) -> Result<String, ApiError> {
        let Some(secret_key) = self.secret_key.as_deref() else {
            return Err(ApiError::service_unavailable("Payments are not configured"));
        };

        let url = format!("{}/v1/payment_intents", self.api_base);
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let resp = self
            .http
            .post(&url)
            .bearer_auth(secret_key)
            .form(&form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .json::<StripeErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| "Payment provider error".to_string());
            tracing::error!(%status, %message, "payment intent creation failed");
            return Err(ApiError::bad_gateway(message));
        }

        let body: PaymentIntentResponse = resp.json().await?;
        body.client_secret
            .ok_or_else(|| ApiError::bad_gateway("Payment provider returned no client secret"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_secret_key_is_unavailable() {
        let client = StripeClient::new("https://api.stripe.com/", None, reqwest::Client::new());
        assert_eq!(client.api_base, "https://api.stripe.com");

        let err = client.create_payment_intent(1000, "eur").await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn error_body_message_is_extracted() {
        let body: StripeErrorResponse = serde_json::from_str(
            r#"{"error":{"type":"card_error","message":"Amount must be at least 50 cents"}}"#,
        )
        .unwrap();
        assert_eq!(body.error.message.as_deref(), Some("Amount must be at least 50 cents"));
    }
}
