//! Cart queries for the `PostgreSQL` store.

use async_trait::async_trait;

use corner_shop_core::{CartId, CartLineId, ProductId, Quantity, SessionKey};

use super::RepositoryError;
use super::postgres::PgTx;
use super::store::CartStore;
use crate::models::{Cart, CartLine};

#[async_trait]
impl CartStore for PgTx {
    async fn find_cart_by_session(
        &mut self,
        key: &SessionKey,
    ) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            r"
            SELECT id, session_key, created_at, updated_at
            FROM shop.cart
            WHERE session_key = $1
            ",
        )
        .bind(key)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(cart)
    }

    async fn create_cart(&mut self, key: &SessionKey) -> Result<Cart, RepositoryError> {
        // The no-op update makes RETURNING yield the row a concurrent
        // request inserted first.
        let cart = sqlx::query_as::<_, Cart>(
            r"
            INSERT INTO shop.cart (session_key)
            VALUES ($1)
            ON CONFLICT (session_key) DO UPDATE SET session_key = EXCLUDED.session_key
            RETURNING id, session_key, created_at, updated_at
            ",
        )
        .bind(key)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(cart)
    }

    async fn cart_lines(&mut self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r"
            SELECT id, cart_id, product_id, quantity, created_at
            FROM shop.cart_line
            WHERE cart_id = $1
            ORDER BY id
            ",
        )
        .bind(cart)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(lines)
    }

    async fn find_line(
        &mut self,
        cart: CartId,
        line: CartLineId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let line = sqlx::query_as::<_, CartLine>(
            r"
            SELECT id, cart_id, product_id, quantity, created_at
            FROM shop.cart_line
            WHERE id = $1 AND cart_id = $2
            ",
        )
        .bind(line)
        .bind(cart)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(line)
    }

    async fn find_line_for_product(
        &mut self,
        cart: CartId,
        product: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let line = sqlx::query_as::<_, CartLine>(
            r"
            SELECT id, cart_id, product_id, quantity, created_at
            FROM shop.cart_line
            WHERE cart_id = $1 AND product_id = $2
            ",
        )
        .bind(cart)
        .bind(product)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(line)
    }

    async fn upsert_line(
        &mut self,
        cart: CartId,
        product: ProductId,
        quantity: Quantity,
    ) -> Result<CartLine, RepositoryError> {
        let line = sqlx::query_as::<_, CartLine>(
            r"
            INSERT INTO shop.cart_line (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
            RETURNING id, cart_id, product_id, quantity, created_at
            ",
        )
        .bind(cart)
        .bind(product)
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await?;

        sqlx::query("UPDATE shop.cart SET updated_at = now() WHERE id = $1")
            .bind(cart)
            .execute(&mut *self.tx)
            .await?;

        Ok(line)
    }

    async fn delete_line(
        &mut self,
        cart: CartId,
        line: CartLineId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_line WHERE id = $1 AND cart_id = $2")
            .bind(line)
            .bind(cart)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_lines(&mut self, cart: CartId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_line WHERE cart_id = $1")
            .bind(cart)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }
}
