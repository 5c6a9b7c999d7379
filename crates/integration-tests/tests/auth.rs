//! Token issuance, bearer verification and the admin gate, through HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::json;

use bangaliana_api::services::auth::TokenService;
use bangaliana_core::Email;
use bangaliana_integration_tests::TestContext;

// ============================================================================
// Token issuance
// ============================================================================

#[tokio::test]
async fn test_profile_upsert_issues_token_for_that_email() {
    let ctx = TestContext::new();

    let response = ctx
        .put("/user/diner@example.com", json!({ "name": "Rahim" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["token"].as_str().unwrap();
    let identity = ctx.tokens.verify(token).unwrap();
    assert_eq!(identity.email.as_str(), "diner@example.com");
}

#[tokio::test]
async fn test_profile_upsert_reports_insert_then_update() {
    let ctx = TestContext::new();

    let first = ctx.put("/user/diner@example.com", json!({})).await;
    assert_eq!(first.body["result"]["upsertedCount"], 1);
    assert_eq!(first.body["result"]["upsertedId"], "diner@example.com");

    let second = ctx
        .put("/user/diner@example.com", json!({ "photo": "p.png" }))
        .await;
    assert_eq!(second.body["result"]["matchedCount"], 1);
    assert_eq!(second.body["result"]["upsertedCount"], 0);
    assert!(second.body["token"].is_string());
}

#[tokio::test]
async fn test_profile_upsert_cannot_grant_admin() {
    let ctx = TestContext::new();

    ctx.put("/user/diner@example.com", json!({ "role": "admin" }))
        .await;

    let status = ctx.get("/admin/diner@example.com").await;
    assert_eq!(status.body, json!({ "admin": false }));
}

#[tokio::test]
async fn test_profile_upsert_rejects_invalid_email() {
    let ctx = TestContext::new();

    let response = ctx.put("/user/not-an-email", json!({})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

// ============================================================================
// Bearer verification
// ============================================================================

#[tokio::test]
async fn test_missing_authorization_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx.get("/order?email=diner@example.com").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "unauthorized access");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Method::GET,
            "/order?email=diner@example.com",
            Some("Basic ZGluZXI6cGFzcw=="),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_without_token_is_forbidden() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Method::GET,
            "/order?email=diner@example.com",
            Some("Bearer"),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "forbidden access");
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let ctx = TestContext::new();
    let email = Email::parse("diner@example.com").unwrap();
    let token = ctx
        .tokens
        .issue_at(&email, Utc::now() - Duration::days(2))
        .unwrap();

    let response = ctx
        .get_as("/order?email=diner@example.com", &token)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tampered_token_is_forbidden() {
    let ctx = TestContext::new();
    let token = ctx.token_for("diner@example.com");
    let (head, _signature) = token.rsplit_once('.').unwrap();
    let forged = format!("{head}.c2lnbmF0dXJl");

    let response = ctx
        .get_as("/order?email=diner@example.com", &forged)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_signed_with_other_key_is_forbidden() {
    let ctx = TestContext::new();
    let other = TokenService::new(&SecretString::from("Qw9eRt5yUi2oPa7sDf4gHj1kLz8xCv3b"));
    let token = other
        .issue(&Email::parse("diner@example.com").unwrap())
        .unwrap();

    let response = ctx
        .get_as("/order?email=diner@example.com", &token)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reading_another_users_orders_is_forbidden() {
    let ctx = TestContext::new();
    let token = ctx.token_for("diner@example.com");

    let response = ctx
        .get_as("/order?email=someone.else@example.com", &token)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owner_read_without_email_query_is_forbidden() {
    let ctx = TestContext::new();
    let token = ctx.token_for("diner@example.com");

    let response = ctx.get_as("/order", &token).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Admin gate
// ============================================================================

#[tokio::test]
async fn test_admin_can_elevate_another_user() {
    let ctx = TestContext::new();
    ctx.seed_admin("chef@example.com").await;
    ctx.seed_user("waiter@example.com").await;
    let token = ctx.token_for("chef@example.com");

    let response = ctx.put_as("/user/admin/waiter@example.com", &token).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["matchedCount"], 1);
    let status = ctx.get("/admin/waiter@example.com").await;
    assert_eq!(status.body, json!({ "admin": true }));
}

#[tokio::test]
async fn test_elevating_unknown_target_matches_nothing() {
    let ctx = TestContext::new();
    ctx.seed_admin("chef@example.com").await;
    let token = ctx.token_for("chef@example.com");

    let response = ctx.put_as("/user/admin/ghost@example.com", &token).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["matchedCount"], 0);
}

#[tokio::test]
async fn test_non_admin_cannot_elevate() {
    let ctx = TestContext::new();
    ctx.seed_user("diner@example.com").await;
    let token = ctx.token_for("diner@example.com");

    let response = ctx.put_as("/user/admin/diner@example.com", &token).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    let status = ctx.get("/admin/diner@example.com").await;
    assert_eq!(status.body, json!({ "admin": false }));
}

#[tokio::test]
async fn test_caller_without_user_record_is_not_admin() {
    let ctx = TestContext::new();
    let token = ctx.token_for("ghost@example.com");

    let response = ctx.put_as("/user/admin/ghost@example.com", &token).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_elevation_without_token_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx
        .send(Method::PUT, "/user/admin/diner@example.com", None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_status_of_unknown_user_is_false() {
    let ctx = TestContext::new();

    let response = ctx.get("/admin/nobody@example.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "admin": false }));
}

#[tokio::test]
async fn test_user_listing_requires_admin() {
    let ctx = TestContext::new();
    ctx.seed_admin("chef@example.com").await;
    ctx.seed_user("diner@example.com").await;

    let denied = ctx
        .get_as("/user", &ctx.token_for("diner@example.com"))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let listed = ctx
        .get_as("/user", &ctx.token_for("chef@example.com"))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 2);
}
