//! Payment intents.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use bangaliana_core::Price;

use crate::error::Result;
use crate::extract::JsonBody;
use crate::services::payments;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub price: Price,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/create-payment-intent", post(create_payment_intent))
}

/// Create a gateway payment intent for `price` and return its client secret.
async fn create_payment_intent(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<IntentRequest>,
) -> Result<Json<IntentResponse>> {
    let client_secret = payments::create_intent(state.gateway(), request.price).await?;
    Ok(Json(IntentResponse { client_secret }))
}
