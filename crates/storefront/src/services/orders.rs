//! Read-only order queries.

use tracing::instrument;

use corner_shop_core::{OrderId, Page};

use super::error::{CommerceError, Resource};
use crate::db::{CatalogStore, OrderStore, Store, StoreTx};
use crate::models::{OrderLine, OrderLineView, OrderSummary, OrderView};

async fn enrich<T: CatalogStore>(
    tx: &mut T,
    lines: Vec<OrderLine>,
) -> Result<Vec<OrderLineView>, CommerceError> {
    let mut views = Vec::with_capacity(lines.len());
    for line in lines {
        let product = tx.find_product(line.product_id).await?;
        views.push(OrderLineView::new(&line, product.as_ref()));
    }
    Ok(views)
}

/// Order lookups. Orders are never modified here.
#[derive(Debug, Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: Store> OrderService<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<OrderView, CommerceError> {
        let mut tx = self.store.begin().await?;
        let order = tx
            .find_order(id)
            .await?
            .ok_or(CommerceError::NotFound(Resource::Order))?;
        let lines = tx.order_lines(order.id).await?;
        let items = enrich(&mut tx, lines).await?;
        tx.commit().await?;
        Ok(OrderView { order, items })
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order_items(&self, id: OrderId) -> Result<Vec<OrderLineView>, CommerceError> {
        let mut tx = self.store.begin().await?;
        if tx.find_order(id).await?.is_none() {
            return Err(CommerceError::NotFound(Resource::Order));
        }
        let lines = tx.order_lines(id).await?;
        let items = enrich(&mut tx, lines).await?;
        tx.commit().await?;
        Ok(items)
    }

    /// Orders newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: Page) -> Result<Vec<OrderSummary>, CommerceError> {
        let mut tx = self.store.begin().await?;
        let orders = tx.list_orders(page).await?;
        tx.commit().await?;
        Ok(orders.into_iter().map(OrderSummary::from).collect())
    }
}
