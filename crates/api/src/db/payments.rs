//! Payment repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::types::Json;

use bangaliana_core::{OrderId, PaymentId};

use super::{PaymentStore, RepositoryError};
use crate::models::{NewPayment, Payment};

/// Internal row type for `PostgreSQL` payment queries.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: PaymentId,
    order_id: OrderId,
    transaction_id: String,
    payload: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            transaction_id: row.transaction_id,
            payload: row.payload.0,
            created_at: row.created_at,
        }
    }
}

/// Repository for payment database operations.
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PaymentRepository {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r"
            INSERT INTO payments (id, order_id, transaction_id, payload)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, transaction_id, payload, created_at
            ",
        )
        .bind(PaymentId::generate())
        .bind(payment.order_id)
        .bind(&payment.transaction_id)
        .bind(Json(&payment.payload))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: PaymentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r"
            SELECT id, order_id, transaction_id, payload, created_at
            FROM payments
            WHERE order_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
