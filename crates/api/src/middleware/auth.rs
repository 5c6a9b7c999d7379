//! Authentication extractors.
//!
//! Provides extractors for requiring a bearer token, and optionally the admin
//! role, in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::{Identity, require_admin};
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Missing credentials reject with 401, an invalid or expired token with 403.
/// The verified identity is cached in the request extensions, so stacking
/// extractors verifies the token once.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(
///     BearerIdentity(identity): BearerIdentity,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.email)
/// }
/// ```
pub struct BearerIdentity(pub Identity);

impl FromRequestParts<AppState> for BearerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(Self(identity.clone()));
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let identity = state.tokens().verify_header(header).inspect_err(|e| {
            warn!(path = %parts.uri.path(), error = %e, "Bearer authentication rejected");
        })?;

        set_sentry_user(identity.email.as_str());
        parts.extensions.insert(identity.clone());

        Ok(Self(identity))
    }
}

/// Extractor that requires a bearer token whose owner holds the admin role.
///
/// Runs [`BearerIdentity`] first, then the admin gate: a caller without a user
/// record or with any other role is rejected with 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn make_admin(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello admin {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerIdentity(identity) = BearerIdentity::from_request_parts(parts, state).await?;
        let admin = require_admin(state.stores().users.as_ref(), &identity).await?;
        Ok(Self(admin))
    }
}
