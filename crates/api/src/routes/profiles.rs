//! Free-form user profile documents.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde_json::{Map, Value};

use super::OwnerQuery;
use crate::error::Result;
use crate::extract::{JsonBody, QueryParam};
use crate::middleware::BearerIdentity;
use crate::models::{Collection, Document, InsertResult};
use crate::services::auth::ensure_owner;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/userProfile", get(my_profiles).post(add_profile))
}

async fn add_profile(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<InsertResult>> {
    super::catalog::insert(&state, Collection::UserProfiles, body).await
}

/// Profile documents of the caller. `?email=` must match the token.
async fn my_profiles(
    State(state): State<AppState>,
    BearerIdentity(identity): BearerIdentity,
    QueryParam(query): QueryParam<OwnerQuery>,
) -> Result<Json<Vec<Document>>> {
    ensure_owner(&identity, query.email.as_deref())?;
    let profiles = state
        .stores()
        .documents
        .find_by_email(Collection::UserProfiles, &identity.email)
        .await?;
    Ok(Json(profiles))
}
