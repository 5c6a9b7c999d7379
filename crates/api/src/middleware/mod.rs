//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (echo or create `x-request-id`)
//! 4. CORS
//!
//! # Auth pipeline
//!
//! Handlers opt in by extractor: [`BearerIdentity`] verifies the bearer token,
//! [`RequireAdmin`] additionally runs the admin gate. Either rejection ends the
//! request with 401/403 before the handler body runs.

pub mod auth;
pub mod request_id;

pub use auth::{BearerIdentity, RequireAdmin};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
