//! Storage for the storefront.
//!
//! # Database: `corner_shop`
//!
//! All tables live in the `shop` schema:
//!
//! - `product` - Catalog
//! - `cart` - One cart per guest session key
//! - `cart_line` - Cart contents, unique per (cart, product)
//! - `guest_order` - Placed orders with frozen totals
//! - `guest_order_line` - Frozen order contents
//!
//! Services talk to the [`Store`] traits only. [`PgStore`] is the production
//! implementation; [`MemoryStore`] backs the test suites and local runs with
//! `STOREFRONT_STORAGE=memory`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p corner-shop-cli -- migrate
//! ```

mod carts;
pub mod memory;
mod orders;
pub mod postgres;
mod products;
pub mod store;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::{PgStore, PgTx};
pub use store::{CartStore, CatalogStore, OrderStore, Store, StoreTx};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A stored value fails its type's validation on decode, e.g. a
    /// negative price or a zero quantity.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique product name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to [`RepositoryError::Conflict`], anything else
    /// to [`RepositoryError::Database`].
    pub(crate) fn from_unique_violation(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::from(err)
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { index, source } => {
                Self::DataCorruption(format!("column {index}: {source}"))
            }
            other => Self::Database(other),
        }
    }
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

/// Apply the embedded storefront migrations.
///
/// # Errors
///
/// Returns the migrator error if any migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use corner_shop_core::PriceError;

    #[test]
    fn test_invalid_stored_value_is_data_corruption() {
        let err = RepositoryError::from(sqlx::Error::ColumnDecode {
            index: "\"price\"".to_owned(),
            source: Box::new(PriceError::Negative(-1)),
        });
        assert!(
            matches!(err, RepositoryError::DataCorruption(ref m) if m.contains("price cannot be negative"))
        );
    }

    #[test]
    fn test_other_sqlx_errors_stay_database() {
        let err = RepositoryError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, RepositoryError::Database(_)));

        let err = RepositoryError::from_unique_violation(sqlx::Error::RowNotFound, "taken");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
