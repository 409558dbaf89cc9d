//! Catalog queries for the `PostgreSQL` store.

use async_trait::async_trait;

use corner_shop_core::ProductId;

use super::RepositoryError;
use super::postgres::PgTx;
use super::store::CatalogStore;
use crate::models::{NewProduct, Product, ProductFilter};

const NAME_TAKEN: &str = "product name already exists";

#[async_trait]
impl CatalogStore for PgTx {
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, image, stock, category, is_active,
                   created_at, updated_at
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    async fn find_product_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, image, stock, category, is_active,
                   created_at, updated_at
            FROM shop.product
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    async fn list_products(
        &mut self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, image, stock, category, is_active,
                   created_at, updated_at
            FROM shop.product
            WHERE ($1::text IS NULL OR category = $1)
              AND (NOT $2 OR is_active)
            ORDER BY id
            OFFSET $3
            LIMIT $4
            ",
        )
        .bind(filter.category.as_deref())
        .bind(filter.active_only)
        .bind(filter.page.offset())
        .bind(filter.page.limit())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(products)
    }

    async fn list_categories(&mut self) -> Result<Vec<String>, RepositoryError> {
        let categories = sqlx::query_scalar::<_, String>(
            r"
            SELECT DISTINCT category
            FROM shop.product
            WHERE category IS NOT NULL
            ORDER BY category
            ",
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(categories)
    }

    async fn insert_product(&mut self, product: &NewProduct) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            INSERT INTO shop.product (name, description, price, image, stock, category, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, price, image, stock, category, is_active,
                      created_at, updated_at
            ",
        )
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price)
        .bind(product.image.as_deref())
        .bind(product.stock)
        .bind(product.category.as_deref())
        .bind(product.is_active)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, NAME_TAKEN))
    }

    async fn update_product(&mut self, product: &Product) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE shop.product
            SET name = $2, description = $3, price = $4, image = $5, stock = $6,
                category = $7, is_active = $8, updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, price, image, stock, category, is_active,
                      created_at, updated_at
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price)
        .bind(product.image.as_deref())
        .bind(product.stock)
        .bind(product.category.as_deref())
        .bind(product.is_active)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, NAME_TAKEN))?
        .ok_or(RepositoryError::NotFound)
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<bool, RepositoryError> {
        // cart_line rows go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
