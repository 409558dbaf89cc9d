//! `PostgreSQL` store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::RepositoryError;
use super::store::{Store, StoreTx};

/// Store backed by a `PostgreSQL` pool.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// An open `PostgreSQL` transaction.
///
/// The query implementations live in the `products`, `carts` and `orders`
/// modules next to this one.
pub struct PgTx {
    pub(super) tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
