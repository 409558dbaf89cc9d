//! Commerce error types.

use std::fmt;

use thiserror::Error;

use corner_shop_core::{PriceError, ProductId};

use crate::db::RepositoryError;

/// What a [`CommerceError::NotFound`] was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product,
    CartItem,
    Order,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Product => "product",
            Self::CartItem => "cart item",
            Self::Order => "order",
        })
    }
}

/// Errors surfaced by the cart, checkout, catalog and order services.
///
/// Every variant except [`CommerceError::Repository`] is detected before any
/// write, and in all cases the transaction is dropped uncommitted.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Product, cart line or order absent.
    #[error("{0} not found")]
    NotFound(Resource),

    /// Product exists but is disabled.
    #[error("product {0} is not available")]
    Inactive(ProductId),

    /// Requested quantity exceeds what the product has on hand.
    #[error("insufficient stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: i32,
        available: i32,
    },

    /// Checkout on a cart with no lines.
    #[error("cannot create order from empty cart")]
    EmptyCart,

    /// Duplicate product name.
    #[error("{0}")]
    Conflict(String),

    /// Input passed type checks but breaks a business rule.
    #[error("{0}")]
    Invalid(String),

    /// Storage failure.
    #[error("storage error: {0}")]
    Repository(#[source] RepositoryError),
}

impl From<RepositoryError> for CommerceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Repository(other),
        }
    }
}

impl From<PriceError> for CommerceError {
    fn from(err: PriceError) -> Self {
        match err {
            PriceError::Overflow => Self::Invalid("cart total is too large".to_owned()),
            PriceError::Negative(_) => Self::Invalid(err.to_string()),
        }
    }
}
