//! Seed the catalog from a YAML file.
//!
//! The file is a list of products in the same shape the `POST /products`
//! endpoint accepts:
//!
//! ```yaml
//! - name: Enamel mug
//!   price: 1200
//!   stock: 40
//!   category: kitchen
//! - name: Gift card
//!   price: 2500
//! ```
//!
//! Products whose name already exists are skipped with a warning; any other
//! failure aborts the run.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use corner_shop_storefront::db::{self, PgStore, Store};
use corner_shop_storefront::models::NewProduct;
use corner_shop_storefront::services::{CatalogService, CommerceError};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid product file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to create '{name}': {source}")]
    Product {
        name: String,
        source: CommerceError,
    },
}

/// Outcome of a seed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Parse a YAML product list.
///
/// # Errors
///
/// Returns `SeedError::Parse` on malformed YAML, a negative price, or a
/// missing name or price.
pub fn parse_products(yaml: &str) -> Result<Vec<NewProduct>, SeedError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Create each product through the catalog service.
///
/// # Errors
///
/// Returns the first failure other than a duplicate name.
pub async fn seed_products<S: Store>(
    catalog: &CatalogService<S>,
    products: &[NewProduct],
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    for product in products {
        match catalog.create_product(product).await {
            Ok(created) => {
                info!(product_id = %created.id, name = %created.name, "Created product");
                report.created += 1;
            }
            Err(CommerceError::Conflict(_)) => {
                warn!(name = %product.name, "Product already exists, skipping");
                report.skipped += 1;
            }
            Err(source) => {
                return Err(SeedError::Product {
                    name: product.name.clone(),
                    source,
                });
            }
        }
    }
    Ok(report)
}

/// Seed products from a YAML file into the configured database.
///
/// # Errors
///
/// Returns an error if the database URL is unset, the file cannot be read or
/// parsed, or a product fails to insert for a reason other than a duplicate
/// name.
pub async fn products(file_path: &str) -> Result<SeedReport, SeedError> {
    // Read and parse before connecting to the database
    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| SeedError::Read {
            path: file_path.to_owned(),
            source,
        })?;
    let products = parse_products(&content)?;
    info!(path = %file_path, count = products.len(), "Parsed product file");

    let database_url =
        super::database_url().ok_or(SeedError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;
    let pool = db::create_pool(&database_url).await?;
    let catalog = CatalogService::new(PgStore::new(pool));

    let report = seed_products(&catalog, &products).await?;
    info!(
        created = report.created,
        skipped = report.skipped,
        "Seeding complete"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use corner_shop_storefront::db::MemoryStore;

    const CATALOG: &str = r"
- name: Enamel mug
  price: 1200
  stock: 40
  category: kitchen
- name: Gift card
  price: 2500
";

    #[test]
    fn test_parse_products() {
        let products = parse_products(CATALOG).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].stock, Some(40));
        assert_eq!(products[1].stock, None);
        assert!(products[1].is_active);
    }

    #[test]
    fn test_parse_rejects_negative_price() {
        let result = parse_products("- name: Mug\n  price: -1\n");
        assert!(matches!(result, Err(SeedError::Parse(_))));
    }

    #[tokio::test]
    async fn test_seed_skips_existing_names() {
        let catalog = CatalogService::new(MemoryStore::new());
        let products = parse_products(CATALOG).unwrap();

        let first = seed_products(&catalog, &products).await.unwrap();
        assert_eq!(first, SeedReport { created: 2, skipped: 0 });

        let second = seed_products(&catalog, &products).await.unwrap();
        assert_eq!(second, SeedReport { created: 0, skipped: 2 });
    }

    #[tokio::test]
    async fn test_seed_aborts_on_invalid_product() {
        let catalog = CatalogService::new(MemoryStore::new());
        let products = parse_products("- name: Mug\n  price: 100\n  stock: -5\n").unwrap();

        let result = seed_products(&catalog, &products).await;
        assert!(matches!(result, Err(SeedError::Product { .. })));
    }
}
