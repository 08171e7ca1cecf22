//! Database operations for the storefront `PostgreSQL`.
//!
//! # Tables
//!
//! - `customer` - shopper accounts (password hash + live refresh token)
//! - `owner` - store owner accounts (same credential columns)
//! - `product` - catalog rows joined into cart reads
//! - `cart_line` - authoritative cart, unique `(customer_id, product_id)`
//! - `video` / `video_like` - reels and their like sets
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via
//! `sqlx migrate run` against the configured database.

pub mod carts;
pub mod customers;
pub mod owners;
pub mod products;
pub mod videos;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Errors from the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
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
