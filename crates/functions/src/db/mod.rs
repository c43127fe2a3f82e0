//! Database access for the functions service.
//!
//! # Tables
//!
//! - `discs` - Discs owned by app users
//! - `shipping_addresses` - User shipping addresses (read-only here)
//! - `sticker_orders` - Sticker orders paid through Stripe Checkout
//!
//! Handlers depend on the [`DiscStore`] and [`OrderStore`] traits rather than
//! on a pool, so each invocation works against an explicit store instance:
//! [`PgDiscStore`]/[`PgOrderStore`] in production and [`memory::MemoryStore`]
//! in tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/functions/migrations/` and run via:
//! ```bash
//! cargo run -p aceback-cli -- migrate
//! ```

pub mod discs;
pub mod memory;
pub mod orders;

use std::time::Duration;

use aceback_core::{DiscId, OrderId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::{Disc, StickerOrder};

pub use discs::PgDiscStore;
pub use orders::PgOrderStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage for user-owned discs.
#[async_trait]
pub trait DiscStore: Send + Sync {
    /// Look up a disc by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn find_disc(&self, id: DiscId) -> Result<Option<Disc>, RepositoryError>;

    /// Delete a disc, returning whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn delete_disc(&self, id: DiscId) -> Result<bool, RepositoryError>;
}

/// Storage for sticker orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Look up the order created for a Stripe Checkout Session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<StickerOrder>, RepositoryError>;

    /// Move a `pending_payment` order to `paid`.
    ///
    /// The update only applies while the order is still `pending_payment`.
    /// Returns `None` when the order was not pending (already paid by a
    /// concurrent delivery, or cancelled).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn mark_paid(
        &self,
        id: OrderId,
        payment_intent_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<StickerOrder>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
