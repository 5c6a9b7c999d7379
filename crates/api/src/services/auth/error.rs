//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors raised while authenticating or authorizing a caller.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer credential was presented.
    #[error("missing bearer credentials")]
    MissingCredentials,

    /// Token absent from the header, malformed, expired or badly signed.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Caller is authenticated but may not perform the operation.
    #[error("forbidden")]
    Forbidden,

    /// Signing a token failed.
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
