//! Payment domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bangaliana_core::{OrderId, PaymentId};

/// Body of `PATCH /order/:id`: a gateway transaction the client completed.
///
/// Anything besides `transactionId` (amount, currency, card brand, ...) is
/// stored verbatim on the payment record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub transaction_id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// A payment about to be recorded.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub transaction_id: String,
    pub payload: Map<String, Value>,
}

/// A recorded payment. Never updated once written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: PaymentId,
    pub order_id: OrderId,
    pub transaction_id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl NewPayment {
    /// Build the payment record for a confirmation against `order_id`.
    #[must_use]
    pub fn from_confirmation(order_id: OrderId, confirmation: PaymentConfirmation) -> Self {
        let mut payload = confirmation.payload;
        super::strip_reserved(&mut payload, &["_id", "orderId", "createdAt"]);
        Self {
            order_id,
            transaction_id: confirmation.transaction_id,
            payload,
        }
    }
}
