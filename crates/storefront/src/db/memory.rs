//! In-memory store.
//!
//! A transaction holds the state lock for its whole lifetime and works on a
//! private copy of the state, which replaces the shared state on commit.
//! Transactions therefore run one at a time, and dropping one discards every
//! write it made.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use corner_shop_core::{
    CartId, CartLineId, OrderId, OrderLineId, OrderStatus, Page, ProductId, Quantity, SessionKey,
};

use super::RepositoryError;
use super::store::{CartStore, CatalogStore, OrderStore, Store, StoreTx};
use crate::models::{
    Cart, CartLine, NewOrder, NewOrderLine, NewProduct, Order, OrderLine, Product, ProductFilter,
};

const NAME_TAKEN: &str = "product name already exists";

#[derive(Debug, Clone, Default)]
struct Sequences {
    product: i32,
    cart: i32,
    cart_line: i32,
    order: i32,
    order_line: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    carts: BTreeMap<CartId, Cart>,
    cart_lines: BTreeMap<CartLineId, CartLine>,
    orders: BTreeMap<OrderId, Order>,
    order_lines: BTreeMap<OrderLineId, OrderLine>,
    seq: Sequences,
}

/// Store that keeps everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`StoreTx::commit`] fail with a database error after
    /// all of its writes have been staged. Used to exercise rollback paths.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

/// Transaction on a [`MemoryStore`].
pub struct MemoryTx {
    shared: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
    fail_commit: Arc<AtomicBool>,
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, RepositoryError> {
        let shared = Arc::clone(&self.state).lock_owned().await;
        let work = shared.clone();
        Ok(MemoryTx {
            shared,
            work,
            fail_commit: Arc::clone(&self.fail_next_commit),
        })
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn commit(self) -> Result<(), RepositoryError> {
        let Self {
            mut shared,
            work,
            fail_commit,
        } = self;
        if fail_commit.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }
        *shared = work;
        Ok(())
    }
}

impl MemoryState {
    fn name_taken(&self, name: &str, except: Option<ProductId>) -> bool {
        self.products
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }
}

fn page_bounds(page: Page) -> (usize, usize) {
    let skip = usize::try_from(page.offset()).unwrap_or(0);
    let take = usize::try_from(page.limit()).unwrap_or(0);
    (skip, take)
}

#[async_trait]
impl CatalogStore for MemoryTx {
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.work.products.get(&id).cloned())
    }

    async fn find_product_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        Ok(self.work.products.values().find(|p| p.name == name).cloned())
    }

    async fn list_products(
        &mut self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let (skip, take) = page_bounds(filter.page);
        Ok(self
            .work
            .products
            .values()
            .filter(|p| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|c| p.category.as_ref() == Some(c))
            })
            .filter(|p| !filter.active_only || p.is_active)
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn list_categories(&mut self) -> Result<Vec<String>, RepositoryError> {
        let mut categories: Vec<String> = self
            .work
            .products
            .values()
            .filter_map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn insert_product(&mut self, product: &NewProduct) -> Result<Product, RepositoryError> {
        if self.work.name_taken(&product.name, None) {
            return Err(RepositoryError::Conflict(NAME_TAKEN.to_owned()));
        }
        let now = Utc::now();
        let row = Product {
            id: ProductId::new(next(&mut self.work.seq.product)),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image: product.image.clone(),
            stock: product.stock,
            category: product.category.clone(),
            is_active: product.is_active,
            created_at: now,
            updated_at: now,
        };
        self.work.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_product(&mut self, product: &Product) -> Result<Product, RepositoryError> {
        if !self.work.products.contains_key(&product.id) {
            return Err(RepositoryError::NotFound);
        }
        if self.work.name_taken(&product.name, Some(product.id)) {
            return Err(RepositoryError::Conflict(NAME_TAKEN.to_owned()));
        }
        let mut row = product.clone();
        row.updated_at = Utc::now();
        self.work.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<bool, RepositoryError> {
        if self.work.products.remove(&id).is_none() {
            return Ok(false);
        }
        self.work.cart_lines.retain(|_, line| line.product_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CartStore for MemoryTx {
    async fn find_cart_by_session(
        &mut self,
        key: &SessionKey,
    ) -> Result<Option<Cart>, RepositoryError> {
        Ok(self
            .work
            .carts
            .values()
            .find(|c| &c.session_key == key)
            .cloned())
    }

    async fn create_cart(&mut self, key: &SessionKey) -> Result<Cart, RepositoryError> {
        if let Some(cart) = self.find_cart_by_session(key).await? {
            return Ok(cart);
        }
        let now = Utc::now();
        let cart = Cart {
            id: CartId::new(next(&mut self.work.seq.cart)),
            session_key: key.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn cart_lines(&mut self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        Ok(self
            .work
            .cart_lines
            .values()
            .filter(|l| l.cart_id == cart)
            .cloned()
            .collect())
    }

    async fn find_line(
        &mut self,
        cart: CartId,
        line: CartLineId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        Ok(self
            .work
            .cart_lines
            .get(&line)
            .filter(|l| l.cart_id == cart)
            .cloned())
    }

    async fn find_line_for_product(
        &mut self,
        cart: CartId,
        product: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        Ok(self
            .work
            .cart_lines
            .values()
            .find(|l| l.cart_id == cart && l.product_id == product)
            .cloned())
    }

    async fn upsert_line(
        &mut self,
        cart: CartId,
        product: ProductId,
        quantity: Quantity,
    ) -> Result<CartLine, RepositoryError> {
        let now = Utc::now();
        if let Some(c) = self.work.carts.get_mut(&cart) {
            c.updated_at = now;
        }
        if let Some(line) = self
            .work
            .cart_lines
            .values_mut()
            .find(|l| l.cart_id == cart && l.product_id == product)
        {
            line.quantity = quantity;
            return Ok(line.clone());
        }
        let line = CartLine {
            id: CartLineId::new(next(&mut self.work.seq.cart_line)),
            cart_id: cart,
            product_id: product,
            quantity,
            created_at: now,
        };
        self.work.cart_lines.insert(line.id, line.clone());
        Ok(line)
    }

    async fn delete_line(
        &mut self,
        cart: CartId,
        line: CartLineId,
    ) -> Result<bool, RepositoryError> {
        if self.find_line(cart, line).await?.is_none() {
            return Ok(false);
        }
        Ok(self.work.cart_lines.remove(&line).is_some())
    }

    async fn delete_all_lines(&mut self, cart: CartId) -> Result<u64, RepositoryError> {
        let before = self.work.cart_lines.len();
        self.work.cart_lines.retain(|_, l| l.cart_id != cart);
        let removed = before - self.work.cart_lines.len();
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl OrderStore for MemoryTx {
    async fn create_order(&mut self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = Order {
            id: OrderId::new(next(&mut self.work.seq.order)),
            guest_name: order.guest.guest_name.clone(),
            guest_email: order.guest.guest_email.clone(),
            guest_phone: order.guest.guest_phone.clone(),
            status: OrderStatus::Pending,
            total_price: order.total_price,
            total_items: order.total_items,
            created_at: Utc::now(),
        };
        self.work.orders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn create_lines(
        &mut self,
        order: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        if !self.work.orders.contains_key(&order) {
            return Err(RepositoryError::NotFound);
        }
        let mut created = Vec::with_capacity(lines.len());
        for line in lines {
            let row = OrderLine {
                id: OrderLineId::new(next(&mut self.work.seq.order_line)),
                order_id: order,
                product_id: line.product_id,
                quantity: line.quantity,
            };
            self.work.order_lines.insert(row.id, row.clone());
            created.push(row);
        }
        Ok(created)
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.work.orders.get(&id).cloned())
    }

    async fn order_lines(&mut self, order: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        Ok(self
            .work
            .order_lines
            .values()
            .filter(|l| l.order_id == order)
            .cloned()
            .collect())
    }

    async fn list_orders(&mut self, page: Page) -> Result<Vec<Order>, RepositoryError> {
        let (skip, take) = page_bounds(page);
        let mut orders: Vec<Order> = self.work.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders.into_iter().skip(skip).take(take).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use corner_shop_core::Price;

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            description: None,
            price: Price::from_minor(500).unwrap(),
            image: None,
            stock: Some(3),
            category: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_dropped_tx_rolls_back() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.insert_product(&new_product("Mug")).await.unwrap();
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_product_by_name("Mug").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_commit_discards_writes() {
        let store = MemoryStore::new();
        store.fail_next_commit();

        let mut tx = store.begin().await.unwrap();
        tx.insert_product(&new_product("Mug")).await.unwrap();
        assert!(tx.commit().await.is_err());

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_product_by_name("Mug").await.unwrap().is_none());
        tx.insert_product(&new_product("Mug")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_product_by_name("Mug").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_product(&new_product("Mug")).await.unwrap();
        let err = tx.insert_product(&new_product("Mug")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_line_per_product() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let mug = tx.insert_product(&new_product("Mug")).await.unwrap();
        let cart = tx.create_cart(&SessionKey::default()).await.unwrap();

        let first = tx
            .upsert_line(cart.id, mug.id, Quantity::new(1).unwrap())
            .await
            .unwrap();
        let second = tx
            .upsert_line(cart.id, mug.id, Quantity::new(3).unwrap())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let lines = tx.cart_lines(cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity.get(), 3);
    }

    #[tokio::test]
    async fn test_delete_product_cascades_to_cart_lines() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let mug = tx.insert_product(&new_product("Mug")).await.unwrap();
        let cart = tx.create_cart(&SessionKey::default()).await.unwrap();
        tx.upsert_line(cart.id, mug.id, Quantity::ONE).await.unwrap();

        assert!(tx.delete_product(mug.id).await.unwrap());
        assert!(tx.cart_lines(cart.id).await.unwrap().is_empty());
        assert!(!tx.delete_product(mug.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_line_is_scoped_to_cart() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let mug = tx.insert_product(&new_product("Mug")).await.unwrap();
        let mine = tx.create_cart(&SessionKey::parse("mine").unwrap()).await.unwrap();
        let theirs = tx.create_cart(&SessionKey::parse("theirs").unwrap()).await.unwrap();
        let line = tx.upsert_line(mine.id, mug.id, Quantity::ONE).await.unwrap();

        assert!(tx.find_line(theirs.id, line.id).await.unwrap().is_none());
        assert!(!tx.delete_line(theirs.id, line.id).await.unwrap());
        assert!(tx.find_line(mine.id, line.id).await.unwrap().is_some());
    }
}
