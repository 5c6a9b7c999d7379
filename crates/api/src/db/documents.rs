//! Document repository for the schemaless collections.
//!
//! Food items, reviews and user profiles all live in one `documents` table,
//! partitioned by a `collection` column, with the client's object kept as
//! JSONB.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::types::Json;

use bangaliana_core::{DocumentId, Email};

use super::{DocumentStore, RepositoryError};
use crate::models::{Collection, Document};

/// Internal row type for `PostgreSQL` document queries.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: DocumentId,
    body: Json<Map<String, Value>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            body: row.body.0,
        }
    }
}

/// Repository for document database operations.
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn insert(
        &self,
        collection: Collection,
        body: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            INSERT INTO documents (id, collection, body)
            VALUES ($1, $2, $3)
            RETURNING id, body
            ",
        )
        .bind(DocumentId::generate())
        .bind(collection.as_str())
        .bind(Json(&body))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body
            FROM documents
            WHERE collection = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_email(
        &self,
        collection: Collection,
        email: &Email,
    ) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND body ->> 'email' = $2
            ORDER BY created_at ASC
            ",
        )
        .bind(collection.as_str())
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn merge(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Map<String, Value>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET body = body || $3
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&fields))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: DocumentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
