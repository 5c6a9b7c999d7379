//! Order placement, owner reads, updates and payment confirmation.
//!
//! Placement, update and delete are open to any caller, matching the web
//! client this API serves; only the by-owner listing requires a token.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use tracing::{info, instrument};

use bangaliana_core::OrderId;

use super::OwnerQuery;
use crate::db::Upserted;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{JsonBody, PathParam, QueryParam};
use crate::middleware::{BearerIdentity, RequireAdmin};
use crate::models::{
    DeleteResult, InsertResult, NewOrder, Order, OrderUpdate, PaymentConfirmation, UpdateResult,
};
use crate::services::auth::ensure_owner;
use crate::services::payments::ConfirmedPayment;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order", get(my_orders).post(place_order))
        .route(
            "/order/{id}",
            get(get_order)
                .put(update_order)
                .patch(confirm_payment)
                .delete(delete_order),
        )
        .route("/admin/orders", get(all_orders))
}

/// Place a new, unpaid order.
#[instrument(skip_all)]
async fn place_order(
    State(state): State<AppState>,
    JsonBody(order): JsonBody<NewOrder>,
) -> Result<Json<InsertResult>> {
    let order = state.stores().orders.insert(order.sanitized()).await?;
    info!(order_id = %order.id, "Order placed");
    Ok(Json(InsertResult::new(order.id)))
}

/// Orders belonging to the caller. `?email=` must match the token.
async fn my_orders(
    State(state): State<AppState>,
    BearerIdentity(identity): BearerIdentity,
    QueryParam(query): QueryParam<OwnerQuery>,
) -> Result<Json<Vec<Order>>> {
    ensure_owner(&identity, query.email.as_deref())?;
    let orders = state.stores().orders.list_by_email(&identity.email).await?;
    Ok(Json(orders))
}

/// A single order, or `null` when it does not exist.
async fn get_order(
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderId>,
) -> Result<Json<Option<Order>>> {
    Ok(Json(state.stores().orders.get(id).await?))
}

/// Replace the editable fields of an order, creating it if absent.
///
/// The body is an array whose first element is the update.
#[instrument(skip(state, updates), fields(order_id = %id))]
async fn update_order(
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderId>,
    JsonBody(updates): JsonBody<Vec<OrderUpdate>>,
) -> Result<Json<UpdateResult>> {
    let update = updates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::BadRequest("expected an array with one order".to_string()))?;

    let result = match state.stores().orders.upsert(id, update).await? {
        Upserted::Inserted => {
            info!("Order created by update");
            UpdateResult::upserted(id)
        }
        Upserted::Updated => UpdateResult::matched(1),
    };
    Ok(Json(result))
}

/// Record a completed payment and mark the order paid.
#[instrument(skip(state, confirmation), fields(order_id = %id))]
async fn confirm_payment(
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderId>,
    JsonBody(confirmation): JsonBody<PaymentConfirmation>,
) -> Result<Json<ConfirmedPayment>> {
    add_breadcrumb(
        "payment",
        "Payment confirmation received",
        Some(&[("order_id", &id.to_string())]),
    );
    let confirmed = state.reconciler().confirm(id, confirmation).await?;
    Ok(Json(confirmed))
}

#[instrument(skip(state), fields(order_id = %id))]
async fn delete_order(
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderId>,
) -> Result<Json<DeleteResult>> {
    let deleted = state.stores().orders.delete(id).await?;
    if deleted {
        info!("Order deleted");
    }
    Ok(Json(DeleteResult::new(deleted)))
}

/// Every order, newest first.
async fn all_orders(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.stores().orders.list().await?))
}
