//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                        - Banner
//! GET    /health                  - Liveness
//! GET    /health/ready            - Readiness (database ping)
//!
//! # Users
//! GET    /user                    - List users (admin)
//! PUT    /user/{email}            - Upsert profile, returns a fresh token
//! PUT    /user/admin/{email}      - Grant admin role (admin)
//! GET    /admin/{email}           - {admin: bool}
//!
//! # Orders
//! POST   /order                   - Place an order
//! GET    /order?email=            - Caller's own orders (bearer)
//! GET    /order/{id}              - Single order or null
//! PUT    /order/{id}              - Replace/upsert editable fields
//! PATCH  /order/{id}              - Confirm payment
//! DELETE /order/{id}              - Delete an order
//! GET    /admin/orders            - Every order (admin)
//!
//! # Payments
//! POST   /create-payment-intent   - {price} -> {clientSecret}
//!
//! # Catalog
//! GET    /food, /food/{id}        - Menu
//! POST   /food                    - Add menu item
//! PUT    /food/{id}               - Merge fields into a menu item
//! DELETE /food/{id}               - Remove menu item
//! GET    /reviews                 - Reviews
//! POST   /reviews                 - Post a review
//!
//! # Profiles
//! POST   /userProfile             - Store a profile document
//! GET    /userProfile?email=      - Caller's own profile documents (bearer)
//! ```

pub mod catalog;
pub mod orders;
pub mod payments;
pub mod profiles;
pub mod users;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::state::AppState;

/// `?email=` on owner-scoped reads.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub email: Option<String>,
}

/// Build every route of the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(users::routes())
        .merge(orders::routes())
        .merge(payments::routes())
        .merge(catalog::routes())
        .merge(profiles::routes())
}

async fn home() -> &'static str {
    "Bangaliana server is running"
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Pings the database when one is configured; returns 503 if unreachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
