//! Catalog reads and management.

use tracing::{info, instrument};

use corner_shop_core::ProductId;

use super::error::{CommerceError, Resource};
use crate::db::{CatalogStore, Store, StoreTx};
use crate::models::{NewProduct, Product, ProductChanges, ProductFilter};

fn validate_name(name: &str) -> Result<(), CommerceError> {
    if name.trim().is_empty() {
        return Err(CommerceError::Invalid("product name cannot be empty".to_owned()));
    }
    Ok(())
}

fn validate_stock(stock: Option<i32>) -> Result<(), CommerceError> {
    match stock {
        Some(n) if n < 0 => Err(CommerceError::Invalid(
            "stock cannot be negative".to_owned(),
        )),
        _ => Ok(()),
    }
}

/// Product catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, CommerceError> {
        let mut tx = self.store.begin().await?;
        let products = tx.list_products(filter).await?;
        tx.commit().await?;
        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, CommerceError> {
        let mut tx = self.store.begin().await?;
        let categories = tx.list_categories().await?;
        tx.commit().await?;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        let mut tx = self.store.begin().await?;
        let product = tx
            .find_product(id)
            .await?
            .ok_or(CommerceError::NotFound(Resource::Product))?;
        tx.commit().await?;
        Ok(product)
    }

    /// # Errors
    ///
    /// - `Invalid` on an empty name or negative stock
    /// - `Conflict` if the name is taken
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &NewProduct) -> Result<Product, CommerceError> {
        validate_name(&input.name)?;
        validate_stock(input.stock)?;

        let mut tx = self.store.begin().await?;
        if tx.find_product_by_name(&input.name).await?.is_some() {
            return Err(CommerceError::Conflict(
                "product with this name already exists".to_owned(),
            ));
        }
        let product = tx.insert_product(input).await?;
        tx.commit().await?;

        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the product does not exist
    /// - `Invalid` on an empty name or negative stock
    /// - `Conflict` if renaming to a taken name
    #[instrument(skip(self, changes), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, CommerceError> {
        if let Some(name) = &changes.name {
            validate_name(name)?;
        }
        validate_stock(changes.stock)?;

        let mut tx = self.store.begin().await?;
        let mut product = tx
            .find_product(id)
            .await?
            .ok_or(CommerceError::NotFound(Resource::Product))?;
        if let Some(name) = &changes.name
            && let Some(other) = tx.find_product_by_name(name).await?
            && other.id != id
        {
            return Err(CommerceError::Conflict(
                "product with this name already exists".to_owned(),
            ));
        }

        changes.apply_to(&mut product);
        let product = tx.update_product(&product).await?;
        tx.commit().await?;

        info!("product updated");
        Ok(product)
    }

    /// Delete a product. Cart lines referencing it go with it; order lines
    /// keep their product id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CommerceError> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_product(id).await? {
            return Err(CommerceError::NotFound(Resource::Product));
        }
        tx.commit().await?;

        info!("product deleted");
        Ok(())
    }
}
