//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::types::Json;

use bangaliana_core::{Email, Role};

use super::{RepositoryError, Upserted, UserStore};
use crate::models::User;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    email: String,
    role: String,
    profile: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            email,
            role,
            profile: row.profile.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT email, role, profile, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT email, role, profile, created_at, updated_at
            FROM users
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn upsert_profile(
        &self,
        email: &Email,
        profile: Map<String, Value>,
    ) -> Result<Upserted, RepositoryError> {
        // xmax is zero only for a row this statement inserted
        let inserted = sqlx::query_scalar::<_, bool>(
            r"
            INSERT INTO users (email, profile)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE
                SET profile = users.profile || EXCLUDED.profile,
                    updated_at = now()
            RETURNING (xmax = 0) AS inserted
            ",
        )
        .bind(email)
        .bind(Json(profile))
        .fetch_one(&self.pool)
        .await?;

        Ok(Upserted::from_inserted(inserted))
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET role = $2, updated_at = now()
            WHERE email = $1
            ",
        )
        .bind(email)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
