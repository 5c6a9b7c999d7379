//! User accounts, token issuance and role elevation.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use bangaliana_core::{Email, Role};

use crate::db::Upserted;
use crate::error::Result;
use crate::extract::{JsonBody, PathParam};
use crate::middleware::RequireAdmin;
use crate::models::{UpdateResult, User, user::sanitize_profile};
use crate::state::AppState;

/// Response of a profile upsert: the write result plus a fresh token.
#[derive(Debug, Serialize)]
pub struct UpsertUserResponse {
    pub result: UpdateResult,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    pub admin: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users))
        .route("/user/{email}", put(upsert_user))
        .route("/user/admin/{email}", put(make_admin))
        .route("/admin/{email}", get(admin_status))
}

/// Create or update a user profile and issue a token for it.
#[instrument(skip(state, body), fields(email = %email))]
async fn upsert_user(
    State(state): State<AppState>,
    PathParam(email): PathParam<Email>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<UpsertUserResponse>> {
    let outcome = state
        .stores()
        .users
        .upsert_profile(&email, sanitize_profile(body))
        .await?;

    let result = match outcome {
        Upserted::Inserted => {
            info!("User created");
            UpdateResult::upserted(&email)
        }
        Upserted::Updated => UpdateResult::matched(1),
    };
    let token = state.tokens().issue(&email)?;

    Ok(Json(UpsertUserResponse { result, token }))
}

/// Grant the admin role to `email`. The caller must already be an admin.
#[instrument(skip(state, admin), fields(target = %target, by = %admin.email))]
async fn make_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(target): PathParam<Email>,
) -> Result<Json<UpdateResult>> {
    let matched = state.stores().users.set_role(&target, Role::Admin).await?;
    if matched {
        info!("Admin role granted");
    }
    Ok(Json(UpdateResult::matched(u64::from(matched))))
}

/// Whether `email` holds the admin role. Unknown users are not admins.
async fn admin_status(
    State(state): State<AppState>,
    PathParam(email): PathParam<Email>,
) -> Result<Json<AdminStatus>> {
    let admin = state
        .stores()
        .users
        .get(&email)
        .await?
        .is_some_and(|user| user.role.is_admin());
    Ok(Json(AdminStatus { admin }))
}

async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.stores().users.list().await?))
}
