//! Bangaliana Core - Shared types library.
//!
//! This crate provides common types used across all Bangaliana components:
//! - `api` - HTTP backend (accounts, catalog, orders, payments)
//! - `cli` - Command-line tools for migrations and administrator bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
