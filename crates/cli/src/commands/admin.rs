//! Administrator bootstrap command.
//!
//! # Usage
//!
//! ```bash
//! bangaliana-cli admin grant -e chef@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `BANGALIANA_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use serde_json::Map;
use thiserror::Error;

use bangaliana_api::db::{RepositoryError, Upserted, UserRepository, UserStore, create_pool};
use bangaliana_core::{Email, EmailError, Role};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The role update matched no user.
    #[error("No user with email: {0}")]
    UserNotFound(String),
}

/// Grant the admin role to `email`, creating the user record if needed.
///
/// # Errors
///
/// Returns an error if the email is invalid or the database is unreachable.
pub async fn grant(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;

    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("BANGALIANA_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    let users = UserRepository::new(pool);

    if users.upsert_profile(&email, Map::new()).await? == Upserted::Inserted {
        tracing::info!("Created user record for {}", email);
    }

    if !users.set_role(&email, Role::Admin).await? {
        return Err(AdminError::UserNotFound(email.to_string()));
    }

    tracing::info!("Admin role granted to {}", email);
    Ok(())
}
