//! Food catalog, reviews, profile documents and health endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use bangaliana_integration_tests::TestContext;

async fn add_food(ctx: &TestContext, body: Value) -> String {
    let response = ctx.post("/food", body).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["acknowledged"], true);
    response.body["insertedId"].as_str().unwrap().to_owned()
}

// ============================================================================
// Food
// ============================================================================

#[tokio::test]
async fn test_food_is_stored_as_sent() {
    let ctx = TestContext::new();
    let id = add_food(
        &ctx,
        json!({ "name": "Shorshe Ilish", "price": 14, "category": "fish" }),
    )
    .await;

    let item = ctx.get(&format!("/food/{id}")).await.body;
    assert_eq!(item["_id"], id.as_str());
    assert_eq!(item["name"], "Shorshe Ilish");
    assert_eq!(item["category"], "fish");

    let menu = ctx.get("/food").await.body;
    assert_eq!(menu.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_client_supplied_id_is_ignored() {
    let ctx = TestContext::new();
    let id = add_food(&ctx, json!({ "_id": "mine", "name": "Fuchka" })).await;

    assert_ne!(id, "mine");
    let item = ctx.get(&format!("/food/{id}")).await.body;
    assert_eq!(item["_id"], id.as_str());
}

#[tokio::test]
async fn test_food_update_merges_fields() {
    let ctx = TestContext::new();
    let id = add_food(&ctx, json!({ "name": "Bhuna Khichuri", "price": 6 })).await;

    let response = ctx
        .put(&format!("/food/{id}"), json!({ "price": 7, "spicy": true }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["matchedCount"], 1);

    let item = ctx.get(&format!("/food/{id}")).await.body;
    assert_eq!(item["name"], "Bhuna Khichuri");
    assert_eq!(item["price"], 7);
    assert_eq!(item["spicy"], true);
}

#[tokio::test]
async fn test_updating_unknown_food_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .put(
            "/food/3c2b1a09-8f7e-4d6c-9b5a-4e3d2c1b0a9f",
            json!({ "price": 1 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "food not found");
}

#[tokio::test]
async fn test_food_delete_reports_deleted_count() {
    let ctx = TestContext::new();
    let id = add_food(&ctx, json!({ "name": "Mishti Doi" })).await;

    let response = ctx.delete(&format!("/food/{id}")).await;

    assert_eq!(response.body["deletedCount"], 1);
    assert_eq!(ctx.get(&format!("/food/{id}")).await.body, Value::Null);
    assert_eq!(ctx.get("/food").await.body, json!([]));
}

#[tokio::test]
async fn test_food_body_must_be_an_object() {
    let ctx = TestContext::new();

    let response = ctx.post("/food", json!(["not", "an", "object"])).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Reviews
// ============================================================================

#[tokio::test]
async fn test_reviews_are_kept_apart_from_food() {
    let ctx = TestContext::new();
    add_food(&ctx, json!({ "name": "Chingri Malai Curry" })).await;

    let response = ctx
        .post(
            "/reviews",
            json!({ "name": "Rahim", "rating": 5, "details": "Best biryani in town" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let reviews = ctx.get("/reviews").await.body;
    let reviews = reviews.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["rating"], 5);
    assert_eq!(ctx.get("/food").await.body.as_array().unwrap().len(), 1);
}

// ============================================================================
// Profile documents
// ============================================================================

#[tokio::test]
async fn test_owner_reads_own_profile_documents() {
    let ctx = TestContext::new();
    ctx.post(
        "/userProfile",
        json!({ "email": "diner@example.com", "address": "Dhanmondi 27" }),
    )
    .await;
    ctx.post(
        "/userProfile",
        json!({ "email": "other@example.com", "address": "Gulshan 2" }),
    )
    .await;

    let response = ctx
        .get_as(
            "/userProfile?email=diner@example.com",
            &ctx.token_for("diner@example.com"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let profiles = response.body.as_array().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["address"], "Dhanmondi 27");
}

#[tokio::test]
async fn test_profile_documents_of_others_are_forbidden() {
    let ctx = TestContext::new();

    let response = ctx
        .get_as(
            "/userProfile?email=other@example.com",
            &ctx.token_for("diner@example.com"),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_undecodable_profile_query_is_json_bad_request() {
    let ctx = TestContext::new();

    let response = ctx
        .get_as(
            "/userProfile?email=a@example.com&email=b@example.com",
            &ctx.token_for("a@example.com"),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_profile_documents_require_token() {
    let ctx = TestContext::new();

    let response = ctx.get("/userProfile?email=diner@example.com").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Health and plumbing
// ============================================================================

#[tokio::test]
async fn test_banner_and_health() {
    let ctx = TestContext::new();

    let banner = ctx.get("/").await;
    assert_eq!(banner.status, StatusCode::OK);
    assert_eq!(banner.body, "Bangaliana server is running");

    let health = ctx.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");

    // No database behind in-memory stores
    let ready = ctx.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_every_response_carries_request_id() {
    let ctx = TestContext::new();

    let ok = ctx.get("/health").await;
    let missing = ctx.get("/no/such/route").await;

    assert!(ok.headers.contains_key("x-request-id"));
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
