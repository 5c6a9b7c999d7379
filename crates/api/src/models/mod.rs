//! Domain models for the API.
//!
//! Records keep the document-store wire shape the web client was written
//! against: `_id` keys, camelCase fields, and free-form extra fields kept
//! alongside the typed ones.

pub mod document;
pub mod order;
pub mod payment;
pub mod user;

use serde::Serialize;

pub use document::{Collection, Document};
pub use order::{NewOrder, Order, OrderUpdate};
pub use payment::{NewPayment, Payment, PaymentConfirmation};
pub use user::User;

/// Remove keys the server owns from a client-supplied object.
pub(crate) fn strip_reserved(
    fields: &mut serde_json::Map<String, serde_json::Value>,
    reserved: &[&str],
) {
    for key in reserved {
        fields.remove(*key);
    }
}

/// Response body for a single insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertResult {
    #[must_use]
    pub fn new(id: impl ToString) -> Self {
        Self {
            acknowledged: true,
            inserted_id: id.to_string(),
        }
    }
}

/// Response body for a single update or upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateResult {
    /// An update that matched (and modified) `matched` records.
    #[must_use]
    pub const fn matched(matched: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count: matched,
            modified_count: matched,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    /// An upsert that created the record `id`.
    #[must_use]
    pub fn upserted(id: impl ToString) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id.to_string()),
        }
    }
}

/// Response body for a single delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    #[must_use]
    pub const fn new(deleted: bool) -> Self {
        Self {
            acknowledged: true,
            deleted_count: if deleted { 1 } else { 0 },
        }
    }
}
