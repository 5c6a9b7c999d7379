//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use bangaliana_core::{Email, Role};

/// Keys a profile upsert may never set.
pub const RESERVED_PROFILE_KEYS: &[&str] = &["_id", "email", "role", "createdAt", "updatedAt"];

/// A user account, keyed by email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identity key.
    pub email: Email,
    /// Authorization role.
    pub role: Role,
    /// Free-form profile fields supplied by the client (name, photo, ...).
    #[serde(flatten)]
    pub profile: Map<String, Value>,
    /// When the user was first upserted.
    pub created_at: DateTime<Utc>,
    /// When the user was last upserted or elevated.
    pub updated_at: DateTime<Utc>,
}

/// Prepare a client profile body for merging into a user record.
///
/// Identity and role are never taken from the body, so a profile upsert cannot
/// re-key or elevate an account.
#[must_use]
pub fn sanitize_profile(mut profile: Map<String, Value>) -> Map<String, Value> {
    super::strip_reserved(&mut profile, RESERVED_PROFILE_KEYS);
    profile
}
