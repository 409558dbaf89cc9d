//! Storage traits.
//!
//! Every service operation opens one transaction with [`Store::begin`], does
//! all its reads and writes through the returned [`StoreTx`], and calls
//! [`StoreTx::commit`] last. A transaction dropped before commit is rolled
//! back, so an early `?` return never leaves partial writes behind.

use async_trait::async_trait;

use corner_shop_core::{CartId, CartLineId, OrderId, Page, ProductId, Quantity, SessionKey};

use super::RepositoryError;
use crate::models::{
    Cart, CartLine, NewOrder, NewOrderLine, NewProduct, Order, OrderLine, Product, ProductFilter,
};

/// Product reads and catalog management writes.
#[async_trait]
pub trait CatalogStore: Send {
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn find_product_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Products matching `filter`, ordered by id.
    async fn list_products(
        &mut self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Distinct non-null categories, sorted.
    async fn list_categories(&mut self) -> Result<Vec<String>, RepositoryError>;

    /// Returns [`RepositoryError::Conflict`] if the name is taken.
    async fn insert_product(&mut self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Overwrite every mutable column of `product` and bump `updated_at`.
    ///
    /// Returns [`RepositoryError::NotFound`] if the row is gone and
    /// [`RepositoryError::Conflict`] if the new name is taken.
    async fn update_product(&mut self, product: &Product) -> Result<Product, RepositoryError>;

    /// Delete a product and every cart line referencing it. Returns whether
    /// a row was deleted.
    async fn delete_product(&mut self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Guest carts and their lines.
#[async_trait]
pub trait CartStore: Send {
    async fn find_cart_by_session(
        &mut self,
        key: &SessionKey,
    ) -> Result<Option<Cart>, RepositoryError>;

    /// Create the cart for `key`, or return the existing one if another
    /// request created it first.
    async fn create_cart(&mut self, key: &SessionKey) -> Result<Cart, RepositoryError>;

    /// Lines of a cart in insertion order.
    async fn cart_lines(&mut self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError>;

    /// A line by id, only if it belongs to `cart`.
    async fn find_line(
        &mut self,
        cart: CartId,
        line: CartLineId,
    ) -> Result<Option<CartLine>, RepositoryError>;

    async fn find_line_for_product(
        &mut self,
        cart: CartId,
        product: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError>;

    /// Set the quantity of the (cart, product) line, inserting it if absent.
    async fn upsert_line(
        &mut self,
        cart: CartId,
        product: ProductId,
        quantity: Quantity,
    ) -> Result<CartLine, RepositoryError>;

    /// Returns whether a line was deleted.
    async fn delete_line(&mut self, cart: CartId, line: CartLineId)
    -> Result<bool, RepositoryError>;

    /// Returns the number of lines deleted.
    async fn delete_all_lines(&mut self, cart: CartId) -> Result<u64, RepositoryError>;
}

/// Orders. Rows are never updated or deleted through this trait.
#[async_trait]
pub trait OrderStore: Send {
    async fn create_order(&mut self, order: &NewOrder) -> Result<Order, RepositoryError>;

    async fn create_lines(
        &mut self,
        order: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<Vec<OrderLine>, RepositoryError>;

    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    async fn order_lines(&mut self, order: OrderId) -> Result<Vec<OrderLine>, RepositoryError>;

    /// Orders newest first.
    async fn list_orders(&mut self, page: Page) -> Result<Vec<Order>, RepositoryError>;
}

/// One unit of work across all three stores.
#[async_trait]
pub trait StoreTx: CatalogStore + CartStore + OrderStore + Sized {
    /// Make every write in this transaction visible at once.
    async fn commit(self) -> Result<(), RepositoryError>;
}

/// Cloneable handle to a backing store.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    type Tx: StoreTx;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError>;

    /// One round trip to the backing store.
    async fn health_check(&self) -> Result<(), RepositoryError>;
}
