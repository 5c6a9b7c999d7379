//! Integration tests for Bangaliana.
//!
//! Drives the full router (extractors, handlers, error mapping, middleware)
//! in-process with `tower::ServiceExt::oneshot`, backed by the in-memory
//! stores and a recording payment gateway. No database or network needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bangaliana-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Token issuance, bearer verification, admin gate
//! - `orders` - Order placement, owner reads, upsert, delete
//! - `payments` - Payment intents and confirmation
//! - `catalog` - Food, reviews, profiles, health

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Map, Value};
use tower::ServiceExt;

use bangaliana_api::db::{MemoryStore, Stores, UserStore};
use bangaliana_api::services::auth::TokenService;
use bangaliana_api::services::payments::{GatewayError, PaymentGateway};
use bangaliana_api::state::AppState;
use bangaliana_api::{app, cors_layer};
use bangaliana_core::{CurrencyCode, Email, Role};

/// Signing key used by every test context.
pub const TEST_TOKEN_SECRET: &str = "k3Yx9vQ2mZp7Lr4TbW8nHc6Jd1Fs5Ga0";

/// Gateway double that records every intent request.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<(i64, CurrencyCode)>>,
    declining: bool,
}

impl RecordingGateway {
    /// A gateway that rejects every intent.
    #[must_use]
    pub fn declining() -> Self {
        Self {
            calls: Mutex::default(),
            declining: true,
        }
    }

    /// Every `(amount, currency)` requested so far.
    pub fn calls(&self) -> Vec<(i64, CurrencyCode)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: CurrencyCode,
    ) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push((amount, currency));
        if self.declining {
            return Err(GatewayError::Api {
                status: 402,
                message: "Your card was declined.".to_string(),
            });
        }
        Ok(format!("pi_{amount}_secret_test"))
    }
}

/// Decoded response: status plus JSON body (`Null` when empty, a string when
/// the body is not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

/// A router over fresh in-memory stores.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<RecordingGateway>,
    pub tokens: TokenService,
    app: Router,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_gateway(RecordingGateway::default())
    }

    #[must_use]
    pub fn with_gateway(gateway: RecordingGateway) -> Self {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::in_memory(&store);
        Self::build(store, stores, gateway)
    }

    /// Use `stores` for handlers while keeping `store` for direct inspection.
    #[must_use]
    pub fn with_stores(store: Arc<MemoryStore>, stores: Stores) -> Self {
        Self::build(store, stores, RecordingGateway::default())
    }

    fn build(store: Arc<MemoryStore>, stores: Stores, gateway: RecordingGateway) -> Self {
        let tokens = TokenService::new(&SecretString::from(TEST_TOKEN_SECRET));
        let gateway = Arc::new(gateway);
        let state = AppState::new(stores, tokens.clone(), gateway.clone(), None);

        Self {
            store,
            gateway,
            tokens,
            app: app(state, cors_layer(None)),
        }
    }

    /// A valid token for `email`.
    #[must_use]
    pub fn token_for(&self, email: &str) -> String {
        self.tokens.issue(&Email::parse(email).unwrap()).unwrap()
    }

    /// Create `email` with the admin role directly in the store.
    pub async fn seed_admin(&self, email: &str) {
        let email = Email::parse(email).unwrap();
        self.store.upsert_profile(&email, Map::new()).await.unwrap();
        self.store.set_role(&email, Role::Admin).await.unwrap();
    }

    /// Create `email` with the default role directly in the store.
    pub async fn seed_user(&self, email: &str) {
        let email = Email::parse(email).unwrap();
        self.store.upsert_profile(&email, Map::new()).await.unwrap();
    }

    /// Send a request with optional raw `Authorization` header and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }

    /// GET with `Authorization: Bearer <token>`.
    pub async fn get_as(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(&format!("Bearer {token}")), None)
            .await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, None, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, None, Some(body)).await
    }

    /// PUT with `Authorization: Bearer <token>` and no body.
    pub async fn put_as(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::PUT, uri, Some(&format!("Bearer {token}")), None)
            .await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, None, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None, None).await
    }

    /// Place an order and return its id.
    pub async fn place_order(&self, email: &str, price: Value) -> String {
        let response = self
            .post("/order", serde_json::json!({ "email": email, "price": price }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["insertedId"].as_str().unwrap().to_owned()
    }
}
