//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Store;
use crate::services::{CartService, CatalogService, CheckoutService, OrderService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and gives handlers the
/// configuration and one instance of each service over the same store.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S> {
    config: StorefrontConfig,
    store: S,
    carts: CartService<S>,
    checkout: CheckoutService<S>,
    orders: OrderService<S>,
    catalog: CatalogService<S>,
}

// Manual impl: the derive would require `S: Clone` on the struct itself.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store> AppState<S> {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, store: S) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                carts: CartService::new(store.clone()),
                checkout: CheckoutService::new(store.clone()),
                orders: OrderService::new(store.clone()),
                catalog: CatalogService::new(store.clone()),
                store,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    #[must_use]
    pub fn carts(&self) -> &CartService<S> {
        &self.inner.carts
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService<S> {
        &self.inner.checkout
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService<S> {
        &self.inner.orders
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService<S> {
        &self.inner.catalog
    }
}
