//! Persistence for the API.
//!
//! # Database: `bangaliana`
//!
//! ## Tables
//!
//! - `users` - Accounts keyed by email, with role and free-form profile
//! - `orders` - Customer orders (typed columns + `details` JSONB)
//! - `payments` - Recorded gateway payments, one per confirmation
//! - `documents` - Schemaless collections (food catalog, reviews, user profiles)
//!
//! Handlers only see the store traits below. [`Stores::postgres`] wires the
//! `sqlx` repositories over one process-wide pool; [`Stores::in_memory`] backs
//! tests and local runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bangaliana-cli -- migrate
//! ```

pub mod documents;
pub mod memory;
pub mod orders;
pub mod payments;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bangaliana_core::{DocumentId, Email, OrderId, PaymentId, Role};

use crate::models::{Collection, Document, NewOrder, NewPayment, Order, OrderUpdate, Payment, User};

pub use documents::DocumentRepository;
pub use memory::MemoryStore;
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Whether an upsert matched an existing record or created one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Updated,
    Inserted,
}

impl Upserted {
    #[must_use]
    pub const fn from_inserted(inserted: bool) -> Self {
        if inserted { Self::Inserted } else { Self::Updated }
    }
}

/// Identity store: user records keyed by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by email.
    async fn get(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// List every user.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Create the user or merge `profile` into the existing record.
    async fn upsert_profile(
        &self,
        email: &Email,
        profile: Map<String, Value>,
    ) -> Result<Upserted, RepositoryError>;

    /// Set the role of an existing user. Returns `false` if no user matched.
    async fn set_role(&self, email: &Email, role: Role) -> Result<bool, RepositoryError>;
}

/// Order store.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new, unpaid order.
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn list_by_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError>;

    /// Replace the owner-editable fields of `id`, creating the order if absent.
    async fn upsert(&self, id: OrderId, update: OrderUpdate) -> Result<Upserted, RepositoryError>;

    /// Returns `false` if no order matched.
    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError>;

    /// Flip `paid` to `true` and record the transaction, only if the order
    /// exists and is still unpaid. Returns whether this call made the change.
    async fn mark_paid(&self, id: OrderId, transaction_id: &str) -> Result<bool, RepositoryError>;
}

/// Payment store.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, RepositoryError>;

    /// Remove a payment recorded by a confirmation that did not complete.
    async fn delete(&self, id: PaymentId) -> Result<bool, RepositoryError>;

    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>, RepositoryError>;
}

/// Schemaless document collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(
        &self,
        collection: Collection,
        body: Map<String, Value>,
    ) -> Result<Document, RepositoryError>;

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, RepositoryError>;

    /// Documents whose `email` field equals `email`.
    async fn find_by_email(
        &self,
        collection: Collection,
        email: &Email,
    ) -> Result<Vec<Document>, RepositoryError>;

    async fn get(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, RepositoryError>;

    /// Shallow-merge `fields` into the document. Returns `false` if absent.
    async fn merge(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Map<String, Value>,
    ) -> Result<bool, RepositoryError>;

    async fn delete(&self, collection: Collection, id: DocumentId) -> Result<bool, RepositoryError>;
}

/// The full set of stores handed to request handlers.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub orders: Arc<dyn OrderStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one connection pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            orders: Arc::new(OrderRepository::new(pool.clone())),
            payments: Arc::new(PaymentRepository::new(pool.clone())),
            documents: Arc::new(DocumentRepository::new(pool.clone())),
        }
    }

    /// All four stores backed by one shared in-memory store.
    #[must_use]
    pub fn in_memory(store: &Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            orders: store.clone(),
            payments: store.clone(),
            documents: store.clone(),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
