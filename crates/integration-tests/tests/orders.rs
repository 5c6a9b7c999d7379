//! Order placement, owner reads, upsert and delete, through HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use bangaliana_integration_tests::TestContext;

#[tokio::test]
async fn test_placed_order_starts_unpaid() {
    let ctx = TestContext::new();

    let response = ctx
        .post(
            "/order",
            json!({
                "email": "diner@example.com",
                "price": 12.5,
                "food": "Kacchi Biryani",
                "quantity": 2,
                "paid": true,
                "transactionId": "tx_forged"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["acknowledged"], true);
    let id = response.body["insertedId"].as_str().unwrap();

    let order = ctx.get(&format!("/order/{id}")).await.body;
    assert_eq!(order["_id"], id);
    assert_eq!(order["paid"], false);
    assert_eq!(order["transactionId"], Value::Null);
    assert_eq!(order["price"], json!(12.5));
    assert_eq!(order["food"], "Kacchi Biryani");
    assert_eq!(order["quantity"], 2);
}

#[tokio::test]
async fn test_order_without_price_is_bad_request() {
    let ctx = TestContext::new();

    let response = ctx
        .post("/order", json!({ "email": "diner@example.com" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_owner_sees_only_their_orders() {
    let ctx = TestContext::new();
    let mine = ctx.place_order("diner@example.com", json!(10)).await;
    ctx.place_order("other@example.com", json!(20)).await;

    let response = ctx
        .get_as(
            "/order?email=diner@example.com",
            &ctx.token_for("diner@example.com"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let orders = response.body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["_id"], mine.as_str());
}

#[tokio::test]
async fn test_unknown_order_reads_as_null() {
    let ctx = TestContext::new();

    let response = ctx
        .get("/order/5f0c6d8e-3b7a-4a59-9c1e-2d4f6a8b0c1d")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, Value::Null);
}

#[tokio::test]
async fn test_malformed_order_id_is_bad_request() {
    let ctx = TestContext::new();

    let response = ctx.get("/order/not-a-uuid").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_of_unknown_id_creates_order() {
    let ctx = TestContext::new();
    let id = "0e9a2f4c-7d1b-4c3e-8f5a-6b7c8d9e0f1a";

    let response = ctx
        .put(
            &format!("/order/{id}"),
            json!([{
                "email": "diner@example.com",
                "price": 8,
                "status": "pending",
                "description": "extra raita",
                "phone": "01700000000"
            }]),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["upsertedCount"], 1);
    assert_eq!(response.body["upsertedId"], id);

    let order = ctx.get(&format!("/order/{id}")).await.body;
    assert_eq!(order["email"], "diner@example.com");
    assert_eq!(order["price"], 8);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["description"], "extra raita");
    assert_eq!(order["phone"], "01700000000");
    assert_eq!(order["paid"], false);
}

#[tokio::test]
async fn test_update_replaces_editable_fields() {
    let ctx = TestContext::new();
    let id = ctx.place_order("diner@example.com", json!(10)).await;

    let response = ctx
        .put(
            &format!("/order/{id}"),
            json!([{ "email": "diner@example.com", "price": 15, "status": "cooking" }]),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["matchedCount"], 1);
    assert_eq!(response.body["upsertedId"], Value::Null);

    let order = ctx.get(&format!("/order/{id}")).await.body;
    assert_eq!(order["price"], 15);
    assert_eq!(order["status"], "cooking");
}

#[tokio::test]
async fn test_update_with_empty_array_is_bad_request() {
    let ctx = TestContext::new();
    let id = ctx.place_order("diner@example.com", json!(10)).await;

    let response = ctx.put(&format!("/order/{id}"), json!([])).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_reports_deleted_count() {
    let ctx = TestContext::new();
    let id = ctx.place_order("diner@example.com", json!(10)).await;

    let first = ctx.delete(&format!("/order/{id}")).await;
    assert_eq!(first.body, json!({ "acknowledged": true, "deletedCount": 1 }));

    let second = ctx.delete(&format!("/order/{id}")).await;
    assert_eq!(second.body["deletedCount"], 0);
    assert_eq!(ctx.get(&format!("/order/{id}")).await.body, Value::Null);
}

#[tokio::test]
async fn test_listing_every_order_requires_admin() {
    let ctx = TestContext::new();
    ctx.seed_admin("chef@example.com").await;
    ctx.place_order("a@example.com", json!(1)).await;
    ctx.place_order("b@example.com", json!(2)).await;

    let denied = ctx
        .get_as("/admin/orders", &ctx.token_for("a@example.com"))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let listed = ctx
        .get_as("/admin/orders", &ctx.token_for("chef@example.com"))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_undecodable_owner_query_is_json_bad_request() {
    let ctx = TestContext::new();
    let token = ctx.token_for("diner@example.com");

    let response = ctx
        .get_as(
            "/order?email=diner@example.com&email=other@example.com",
            &token,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}
