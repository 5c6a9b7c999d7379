//! Order repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::types::Json;

use bangaliana_core::{Email, OrderId, Price};

use super::{OrderStore, RepositoryError, Upserted};
use crate::models::{NewOrder, Order, OrderUpdate};

const ORDER_COLUMNS: &str = "id, email, price, status, description, phone, paid, \
                             transaction_id, details, created_at, updated_at";

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    email: String,
    price: Price,
    status: Option<String>,
    description: Option<String>,
    phone: Option<String>,
    paid: bool,
    transaction_id: Option<String>,
    details: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            price: row.price,
            status: row.status,
            description: row.description,
            phone: row.phone,
            paid: row.paid,
            transaction_id: row.transaction_id,
            details: row.details.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for order database operations.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO orders (id, email, price, status, description, phone, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(OrderId::generate())
            .bind(&order.email)
            .bind(order.price)
            .bind(&order.status)
            .bind(&order.description)
            .bind(&order.phone)
            .bind(Json(&order.details))
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");

        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_by_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE email = $1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn upsert(&self, id: OrderId, update: OrderUpdate) -> Result<Upserted, RepositoryError> {
        let inserted = sqlx::query_scalar::<_, bool>(
            r"
            INSERT INTO orders (id, email, price, status, description, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
                SET email = EXCLUDED.email,
                    price = EXCLUDED.price,
                    status = EXCLUDED.status,
                    description = EXCLUDED.description,
                    phone = EXCLUDED.phone,
                    updated_at = now()
            RETURNING (xmax = 0) AS inserted
            ",
        )
        .bind(id)
        .bind(&update.email)
        .bind(update.price)
        .bind(&update.status)
        .bind(&update.description)
        .bind(&update.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(Upserted::from_inserted(inserted))
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_paid(&self, id: OrderId, transaction_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET paid = TRUE, transaction_id = $2, updated_at = now()
            WHERE id = $1 AND paid = FALSE
            ",
        )
        .bind(id)
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
