//! Bearer-token authentication and the admin gate.
//!
//! # Pipeline
//!
//! ```text
//! Authorization header --verify_header--> Identity --require_admin--> User (admin)
//! ```
//!
//! Tokens are HS256 JWTs with claims `{email, iat, exp}` and a one-day
//! lifetime. They are minted by [`TokenService::issue`] whenever a user profile
//! is upserted; there is no separate login step.

mod error;

pub use error::AuthError;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bangaliana_core::Email;

use crate::db::UserStore;
use crate::models::User;

/// How long an issued token stays valid.
pub const TOKEN_TTL: Duration = Duration::days(1);

const BEARER_SCHEME: &str = "Bearer";

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: Email,
}

/// Issues and verifies access tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Mint a token for `email`, valid for [`TOKEN_TTL`] from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the token cannot be encoded.
    pub fn issue(&self, email: &Email) -> Result<String, AuthError> {
        self.issue_at(email, Utc::now())
    }

    /// Mint a token as if it had been issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the token cannot be encoded.
    pub fn issue_at(&self, email: &Email, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            email: email.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + TOKEN_TTL).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Signing)
    }

    /// Verify a bare token and return the identity it carries.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, expired,
    /// signed with another key, or carries an invalid email.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AuthError::InvalidToken
            })?;

        let email = Email::parse(&data.claims.email).map_err(|e| {
            debug!(error = %e, "Token carries an invalid email");
            AuthError::InvalidToken
        })?;

        Ok(Identity { email })
    }

    /// Verify the raw value of an `Authorization` header.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingCredentials` if the header is absent or not a
    ///   bearer credential
    /// - `AuthError::InvalidToken` if the token segment is missing or invalid
    pub fn verify_header(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let token = bearer_token(header)?;
        self.verify(token)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let mut segments = header
        .ok_or(AuthError::MissingCredentials)?
        .split_whitespace();

    match segments.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {}
        _ => return Err(AuthError::MissingCredentials),
    }

    segments.next().ok_or(AuthError::InvalidToken)
}

/// Admit only callers whose stored role is admin.
///
/// A caller with no user record is treated as a non-admin.
///
/// # Errors
///
/// Returns `AuthError::Forbidden` for non-admins and `AuthError::Repository`
/// if the lookup fails.
pub async fn require_admin(users: &dyn UserStore, identity: &Identity) -> Result<User, AuthError> {
    match users.get(&identity.email).await? {
        Some(user) if user.role.is_admin() => Ok(user),
        Some(_) => {
            warn!(email = %identity.email, "Admin gate denied non-admin caller");
            Err(AuthError::Forbidden)
        }
        None => {
            warn!(email = %identity.email, "Admin gate denied unknown caller");
            Err(AuthError::Forbidden)
        }
    }
}

/// Check that a "my data" read targets the caller's own email.
///
/// # Errors
///
/// Returns `AuthError::Forbidden` when `requested` is absent or differs from
/// the caller's email.
pub fn ensure_owner(identity: &Identity, requested: Option<&str>) -> Result<(), AuthError> {
    if requested == Some(identity.email.as_str()) {
        Ok(())
    } else {
        warn!(
            email = %identity.email,
            requested = ?requested,
            "Identity mismatch on owner-scoped read"
        );
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::Map;

    use bangaliana_core::Role;

    use super::*;
    use crate::db::MemoryStore;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("k3Yx9vQ2mZp7Lr4TbW8nHc6Jd1Fs5Ga0"))
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_verify_returns_issued_email() {
        let tokens = service();
        for address in ["diner@example.com", "a.b+c@sub.example.org"] {
            let token = tokens.issue(&email(address)).unwrap();
            let identity = tokens.verify(&token).unwrap();
            assert_eq!(identity.email.as_str(), address);
        }
    }

    #[test]
    fn test_token_expires_after_a_day() {
        let tokens = service();
        let stale = Utc::now() - TOKEN_TTL - Duration::minutes(5);
        let token = tokens.issue_at(&email("diner@example.com"), stale).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_token_from_another_key_is_rejected() {
        let other = TokenService::new(&SecretString::from("Qw9eRt5yUi2oPa7sDf4gHj1kLz8xCv3b"));
        let token = other.issue(&email("diner@example.com")).unwrap();
        assert!(matches!(service().verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let tokens = service();
        let mut token = tokens.issue(&email("diner@example.com")).unwrap();
        token.push('x');
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_verify_header_without_header_is_missing_credentials() {
        assert!(matches!(
            service().verify_header(None),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_verify_header_with_other_scheme_is_missing_credentials() {
        assert!(matches!(
            service().verify_header(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_verify_header_without_token_is_invalid() {
        assert!(matches!(
            service().verify_header(Some("Bearer")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_header_accepts_bearer_token() {
        let tokens = service();
        let token = tokens.issue(&email("diner@example.com")).unwrap();
        let header = format!("Bearer {token}");
        let identity = tokens.verify_header(Some(&header)).unwrap();
        assert_eq!(identity.email.as_str(), "diner@example.com");
    }

    #[test]
    fn test_ensure_owner() {
        let identity = Identity {
            email: email("diner@example.com"),
        };
        assert!(ensure_owner(&identity, Some("diner@example.com")).is_ok());
        assert!(matches!(
            ensure_owner(&identity, Some("Diner@example.com")),
            Err(AuthError::Forbidden)
        ));
        assert!(matches!(
            ensure_owner(&identity, None),
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let store = Arc::new(MemoryStore::new());
        let admin = email("chef@example.com");
        let diner = email("diner@example.com");
        store.upsert_profile(&admin, Map::new()).await.unwrap();
        store.upsert_profile(&diner, Map::new()).await.unwrap();
        store.set_role(&admin, Role::Admin).await.unwrap();

        let granted = require_admin(store.as_ref(), &Identity { email: admin }).await;
        assert!(granted.is_ok());

        let denied = require_admin(store.as_ref(), &Identity { email: diner }).await;
        assert!(matches!(denied, Err(AuthError::Forbidden)));

        let unknown = require_admin(
            store.as_ref(),
            &Identity {
                email: email("ghost@example.com"),
            },
        )
        .await;
        assert!(matches!(unknown, Err(AuthError::Forbidden)));
    }
}
