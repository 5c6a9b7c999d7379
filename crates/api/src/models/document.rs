//! Schemaless documents: catalog items, reviews and user profiles.

use serde::Serialize;
use serde_json::{Map, Value};

use bangaliana_core::DocumentId;

/// Document collections that carry no typed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Food,
    Reviews,
    UserProfiles,
}

impl Collection {
    /// Stored collection name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Reviews => "reviews",
            Self::UserProfiles => "user_profiles",
        }
    }
}

/// A stored document: an id plus whatever the client sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

/// Drop a client-supplied `_id` so it can't shadow the stored one.
#[must_use]
pub fn sanitize_body(mut body: Map<String, Value>) -> Map<String, Value> {
    super::strip_reserved(&mut body, &["_id"]);
    body
}
