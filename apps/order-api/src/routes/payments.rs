use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/create-payment-intent", post(create_payment_intent))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentIntentRequest {
    /// Amount in the smallest currency unit (cents).
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[utoipa::path(
    post,
    path = "/api/stripe/create-payment-intent",
    tag = "Payments",
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = PaymentIntentResponse),
        (status = 400, description = "Invalid amount or currency", body = ApiErrorBody),
        (status = 502, description = "Payment provider error", body = ApiErrorBody),
        (status = 503, description = "Payments not configured", body = ApiErrorBody),
    ),
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(body): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    let currency = body
        .currency
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());

    let mut errors = Vec::new();
    let amount = match body.amount {
        Some(amount) if amount > 0 => amount as u64,
        _ => {
            errors.push(FieldError {
                field: "amount".to_string(),
                message: "Amount must be a positive integer".to_string(),
            });
            0
        }
    };
    if currency.is_none() {
        errors.push(FieldError {
            field: "currency".to_string(),
            message: "Currency is required".to_string(),
        });
    }
    let Some(currency) = currency.filter(|_| errors.is_empty()) else {
        return Err(ApiError::validation(errors));
    };

    let client_secret = state.payments.create_payment_intent(amount, &currency).await?;
    tracing::info!(amount, %currency, "payment intent created");

    Ok(Json(PaymentIntentResponse { client_secret }))
}
