//! Checkout: turning a cart into an order.
//!
//! Each attempt moves through `Pending -> Validated -> Committed`, or is
//! aborted from either state by dropping its transaction. The order, its
//! lines and the cart clear are written in the same transaction, so an
//! aborted checkout leaves the cart exactly as it was.
//!
//! Totals use the product prices read at checkout time. Stock is not
//! re-checked or decremented here; it is only enforced when lines are added
//! to or updated in a cart.

use tracing::{info, instrument, warn};

use corner_shop_core::{CartId, Price, SessionKey};

use super::error::{CommerceError, Resource};
use crate::db::{CartStore, CatalogStore, OrderStore, Store, StoreTx};
use crate::models::{GuestInfo, NewOrder, NewOrderLine, OrderLineView, OrderView, Product};

/// A checkout that has not looked at the cart yet.
struct Pending<'a> {
    key: &'a SessionKey,
    guest: GuestInfo,
}

/// A checkout whose cart resolved completely.
struct Validated {
    cart_id: CartId,
    guest: GuestInfo,
    lines: Vec<(NewOrderLine, Product)>,
    total_items: i64,
    total_price: Price,
}

impl<'a> Pending<'a> {
    const fn new(key: &'a SessionKey, guest: GuestInfo) -> Self {
        Self { key, guest }
    }

    /// Resolve the cart and every product it references, and compute totals.
    async fn validate<T: StoreTx>(self, tx: &mut T) -> Result<Validated, CommerceError> {
        let cart = tx.create_cart(self.key).await?;
        let cart_lines = tx.cart_lines(cart.id).await?;
        if cart_lines.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        let mut lines = Vec::with_capacity(cart_lines.len());
        for line in cart_lines {
            let product = tx
                .find_product(line.product_id)
                .await?
                .ok_or(CommerceError::NotFound(Resource::Product))?;
            let order_line = NewOrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
            };
            lines.push((order_line, product));
        }

        let total_items = lines
            .iter()
            .map(|(line, _)| i64::from(line.quantity.get()))
            .sum();
        let line_totals = lines
            .iter()
            .map(|(line, product)| product.price.times(line.quantity))
            .collect::<Result<Vec<_>, _>>()?;
        let total_price = Price::total(line_totals)?;

        Ok(Validated {
            cart_id: cart.id,
            guest: self.guest,
            lines,
            total_items,
            total_price,
        })
    }
}

impl Validated {
    /// Write the order and its lines, clear the cart, and commit.
    async fn commit<T: StoreTx>(self, mut tx: T) -> Result<OrderView, CommerceError> {
        let order = tx
            .create_order(&NewOrder {
                guest: self.guest,
                total_price: self.total_price,
                total_items: self.total_items,
            })
            .await?;

        let new_lines: Vec<NewOrderLine> = self.lines.iter().map(|(line, _)| *line).collect();
        let created = tx.create_lines(order.id, &new_lines).await?;
        tx.delete_all_lines(self.cart_id).await?;
        tx.commit().await?;

        let items = created
            .iter()
            .zip(&self.lines)
            .map(|(line, (_, product))| OrderLineView::new(line, Some(product)))
            .collect();
        Ok(OrderView { order, items })
    }
}

/// Places orders from guest carts.
#[derive(Debug, Clone)]
pub struct CheckoutService<S> {
    store: S,
}

impl<S: Store> CheckoutService<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Convert the session's cart into an order and empty the cart.
    ///
    /// # Errors
    ///
    /// - `EmptyCart` if the cart has no lines
    /// - `NotFound` if a line references a product that no longer exists
    /// - `Invalid` if the order total does not fit in a price
    /// - `Repository` if any write or the commit fails
    ///
    /// On error nothing is persisted and the cart is unchanged.
    #[instrument(skip(self, guest), fields(session = %key))]
    pub async fn place_order(
        &self,
        key: &SessionKey,
        guest: GuestInfo,
    ) -> Result<OrderView, CommerceError> {
        let mut tx = self.store.begin().await?;

        let validated = match Pending::new(key, guest).validate(&mut tx).await {
            Ok(validated) => validated,
            Err(err) => {
                warn!(error = %err, stage = "pending", "checkout aborted");
                return Err(err);
            }
        };
        info!(
            lines = validated.lines.len(),
            total_items = validated.total_items,
            total_price = %validated.total_price,
            "checkout validated"
        );

        match validated.commit(tx).await {
            Ok(view) => {
                info!(order_id = %view.order.id, "order committed");
                Ok(view)
            }
            Err(err) => {
                warn!(error = %err, stage = "validated", "checkout aborted");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ProductChanges;
    use crate::services::CartService;
    use crate::services::testing::{guest, qty, seed_product, session};

    #[tokio::test]
    async fn test_checkout_totals_and_clears_cart() {
        let store = MemoryStore::new();
        let p1 = seed_product(&store, "P1", 500, Some(10)).await;
        let p2 = seed_product(&store, "P2", 300, Some(10)).await;
        let carts = CartService::new(store.clone());
        let checkout = CheckoutService::new(store);
        let s1 = session("s1");

        carts.add_item(&s1, p1.id, qty(2)).await.unwrap();
        carts.add_item(&s1, p2.id, qty(1)).await.unwrap();

        let placed = checkout.place_order(&s1, guest()).await.unwrap();
        assert_eq!(placed.order.total_items, 3);
        assert_eq!(placed.order.total_price.minor_units(), 1300);
        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.items[0].line_total.unwrap().minor_units(), 1000);

        let view = carts.view_cart(&s1).await.unwrap();
        assert!(view.is_empty());
        assert_eq!(view.total_price, Price::ZERO);
    }

    #[tokio::test]
    async fn test_new_order_is_pending() {
        let store = MemoryStore::new();
        let p1 = seed_product(&store, "P1", 500, None).await;
        let carts = CartService::new(store.clone());
        let s1 = session("s1");
        carts.add_item(&s1, p1.id, qty(1)).await.unwrap();

        let placed = CheckoutService::new(store)
            .place_order(&s1, guest())
            .await
            .unwrap();
        assert_eq!(placed.order.status, corner_shop_core::OrderStatus::Pending);
        assert_eq!(placed.order.guest_email.as_str(), "ada@example.com");
    }

    #[tokio::test]
    async fn test_empty_cart_creates_no_order() {
        let store = MemoryStore::new();
        let checkout = CheckoutService::new(store.clone());

        let err = checkout
            .place_order(&session("s1"), guest())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::EmptyCart));

        let mut tx = store.begin().await.unwrap();
        assert!(
            tx.list_orders(corner_shop_core::Page::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_cart_and_writes_no_order() {
        let store = MemoryStore::new();
        let p1 = seed_product(&store, "P1", 500, None).await;
        let carts = CartService::new(store.clone());
        let checkout = CheckoutService::new(store.clone());
        let s1 = session("s1");
        carts.add_item(&s1, p1.id, qty(2)).await.unwrap();

        store.fail_next_commit();
        let err = checkout.place_order(&s1, guest()).await.unwrap_err();
        assert!(matches!(err, CommerceError::Repository(_)));

        let view = carts.view_cart(&s1).await.unwrap();
        assert_eq!(view.total_items, 2);
        let mut tx = store.begin().await.unwrap();
        assert!(
            tx.list_orders(corner_shop_core::Page::default())
                .await
                .unwrap()
                .is_empty()
        );
        drop(tx);

        // The cart is intact, so a retry goes through.
        let placed = checkout.place_order(&s1, guest()).await.unwrap();
        assert_eq!(placed.order.total_items, 2);
    }

    #[tokio::test]
    async fn test_vanished_product_aborts_checkout() {
        let store = MemoryStore::new();
        let p1 = seed_product(&store, "P1", 500, None).await;
        let p2 = seed_product(&store, "P2", 300, None).await;
        let carts = CartService::new(store.clone());
        let s1 = session("s1");
        carts.add_item(&s1, p1.id, qty(1)).await.unwrap();
        carts.add_item(&s1, p2.id, qty(1)).await.unwrap();

        // Bypass the catalog cascade by deleting directly, then re-adding
        // the cart line so it points at a missing product.
        let mut tx = store.begin().await.unwrap();
        tx.delete_product(p2.id).await.unwrap();
        let cart = tx.find_cart_by_session(&s1).await.unwrap().unwrap();
        tx.upsert_line(cart.id, p2.id, qty(1)).await.unwrap();
        tx.commit().await.unwrap();

        let err = CheckoutService::new(store.clone())
            .place_order(&s1, guest())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound(Resource::Product)));

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.cart_lines(cart.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_total_too_large_aborts_checkout() {
        let store = MemoryStore::new();
        let big = seed_product(&store, "Big", i64::MAX / 2 + 1, None).await;
        let small = seed_product(&store, "Small", 1, None).await;
        let carts = CartService::new(store.clone());
        let s1 = session("s1");
        carts.add_item(&s1, big.id, qty(1)).await.unwrap();
        carts.add_item(&s1, small.id, qty(1)).await.unwrap();

        // A later repricing pushes the cart total past what a price can hold.
        let mut tx = store.begin().await.unwrap();
        let mut repriced = tx.find_product(small.id).await.unwrap().unwrap();
        repriced.price = big.price;
        tx.update_product(&repriced).await.unwrap();
        tx.commit().await.unwrap();

        let err = CheckoutService::new(store.clone())
            .place_order(&s1, guest())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Invalid(ref m) if m == "cart total is too large"));

        let mut tx = store.begin().await.unwrap();
        assert!(
            tx.list_orders(corner_shop_core::Page::default())
                .await
                .unwrap()
                .is_empty()
        );
        let cart = tx.find_cart_by_session(&s1).await.unwrap().unwrap();
        assert_eq!(tx.cart_lines(cart.id).await.unwrap().len(), 2);
    }

    // Checkout charges the price at checkout time and neither re-checks nor
    // decrements stock. These assertions pin that behavior.
    #[tokio::test]
    async fn test_checkout_uses_live_price_and_leaves_stock_alone() {
        let store = MemoryStore::new();
        let p1 = seed_product(&store, "P1", 500, Some(3)).await;
        let carts = CartService::new(store.clone());
        let checkout = CheckoutService::new(store.clone());
        let alice = session("alice");
        let bob = session("bob");
        carts.add_item(&alice, p1.id, qty(3)).await.unwrap();
        carts.add_item(&bob, p1.id, qty(3)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let mut repriced = tx.find_product(p1.id).await.unwrap().unwrap();
        ProductChanges {
            price: Some(Price::from_minor(700).unwrap()),
            stock: Some(1),
            ..ProductChanges::default()
        }
        .apply_to(&mut repriced);
        tx.update_product(&repriced).await.unwrap();
        tx.commit().await.unwrap();

        let first = checkout.place_order(&alice, guest()).await.unwrap();
        assert_eq!(first.order.total_price.minor_units(), 2100);
        let second = checkout.place_order(&bob, guest()).await.unwrap();
        assert_eq!(second.order.total_items, 3);

        let mut tx = store.begin().await.unwrap();
        let after = tx.find_product(p1.id).await.unwrap().unwrap();
        assert_eq!(after.stock, Some(1));
    }
}
