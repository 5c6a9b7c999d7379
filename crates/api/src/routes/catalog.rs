//! Food catalog and reviews: plain document CRUD without auth.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde_json::{Map, Value};

use bangaliana_core::DocumentId;

use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam};
use crate::models::{
    Collection, DeleteResult, Document, InsertResult, UpdateResult, document::sanitize_body,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/food", get(list_food).post(add_food))
        .route(
            "/food/{id}",
            get(get_food).put(update_food).delete(delete_food),
        )
        .route("/reviews", get(list_reviews).post(add_review))
}

async fn list_food(State(state): State<AppState>) -> Result<Json<Vec<Document>>> {
    Ok(Json(state.stores().documents.list(Collection::Food).await?))
}

async fn get_food(
    State(state): State<AppState>,
    PathParam(id): PathParam<DocumentId>,
) -> Result<Json<Option<Document>>> {
    Ok(Json(
        state.stores().documents.get(Collection::Food, id).await?,
    ))
}

async fn add_food(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<InsertResult>> {
    insert(&state, Collection::Food, body).await
}

/// Merge the body's fields into a menu item.
async fn update_food(
    State(state): State<AppState>,
    PathParam(id): PathParam<DocumentId>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<UpdateResult>> {
    let matched = state
        .stores()
        .documents
        .merge(Collection::Food, id, sanitize_body(body))
        .await?;

    if !matched {
        return Err(AppError::NotFound("food".to_string()));
    }
    Ok(Json(UpdateResult::matched(1)))
}

async fn delete_food(
    State(state): State<AppState>,
    PathParam(id): PathParam<DocumentId>,
) -> Result<Json<DeleteResult>> {
    let deleted = state
        .stores()
        .documents
        .delete(Collection::Food, id)
        .await?;
    Ok(Json(DeleteResult::new(deleted)))
}

async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<Document>>> {
    Ok(Json(
        state.stores().documents.list(Collection::Reviews).await?,
    ))
}

async fn add_review(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<InsertResult>> {
    insert(&state, Collection::Reviews, body).await
}

pub(super) async fn insert(
    state: &AppState,
    collection: Collection,
    body: Map<String, Value>,
) -> Result<Json<InsertResult>> {
    let document = state
        .stores()
        .documents
        .insert(collection, sanitize_body(body))
        .await?;
    tracing::debug!(collection = collection.as_str(), id = %document.id, "Document inserted");
    Ok(Json(InsertResult::new(document.id)))
}
