//! Catalog product types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corner_shop_core::{Page, Price, ProductId, Quantity};

/// A catalog product.
///
/// Read-only from the cart and checkout paths; only catalog management
/// writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor currency units.
    pub price: Price,
    pub image: Option<String>,
    /// Units on hand. `None` means the product is not stock-tracked.
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units could be placed in a cart right now.
    #[must_use]
    pub fn can_supply(&self, quantity: Quantity) -> bool {
        quantity.fits_within(self.stock)
    }
}

const fn default_active() -> bool {
    true
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    /// Omitted or `null` creates an untracked (unlimited) product.
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Partial update for a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image: Option<String>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductChanges {
    /// Apply these changes to an existing product in place.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image) = &self.image {
            product.image = Some(image.clone());
        }
        if let Some(stock) = self.stock {
            product.stock = Some(stock);
        }
        if let Some(category) = &self.category {
            product.category = Some(category.clone());
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
    }
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub active_only: bool,
    pub page: Page,
}
