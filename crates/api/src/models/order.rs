//! Order domain types.
//!
//! # Lifecycle
//!
//! ```text
//! Created --PUT--> Updated* --PATCH (payment confirmed)--> Paid
//! ```
//!
//! `paid` only ever moves from `false` to `true`; nothing resets it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bangaliana_core::{Email, OrderId, Price};

/// Keys a client cannot set when placing an order.
pub const RESERVED_ORDER_KEYS: &[&str] = &["_id", "paid", "transactionId", "createdAt", "updatedAt"];

/// A persisted order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Owner of the order.
    pub email: Email,
    pub price: Price,
    pub status: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    /// Set once by payment reconciliation.
    pub paid: bool,
    /// Gateway transaction recorded when the order was paid.
    pub transaction_id: Option<String>,
    /// Extra fields supplied when the order was placed (item, quantity, address, ...).
    #[serde(flatten)]
    pub details: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /order`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub email: Email,
    pub price: Price,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl NewOrder {
    /// Drop any server-owned keys that arrived among the extra fields.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        super::strip_reserved(&mut self.details, RESERVED_ORDER_KEYS);
        self
    }
}

/// Full replacement of the owner-editable fields, as sent to `PUT /order/:id`.
///
/// Fields missing from the body are cleared rather than left untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdate {
    pub email: Email,
    pub price: Price,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
