//! Cart aggregation.
//!
//! Resolves a session key to its cart, merges and overwrites line
//! quantities under the product's stock limit, and prices the cart against
//! the live catalog. Each operation runs in one store transaction.

use tracing::{debug, instrument};

use corner_shop_core::{CartLineId, Price, ProductId, Quantity, SessionKey};

use super::error::{CommerceError, Resource};
use crate::db::{CartStore, CatalogStore, Store, StoreTx};
use crate::models::{Cart, CartLine, CartLineView, CartView, Product};

/// Fail with [`CommerceError::InsufficientStock`] unless `product` can supply
/// `quantity` units.
pub(crate) fn check_stock(product: &Product, quantity: Quantity) -> Result<(), CommerceError> {
    if product.can_supply(quantity) {
        return Ok(());
    }
    Err(CommerceError::InsufficientStock {
        product: product.id,
        requested: quantity.get(),
        available: product.stock.unwrap_or(0),
    })
}

/// Fail with [`CommerceError::Invalid`] unless the cart total still fits in
/// a [`Price`] once `product`'s line holds `quantity` units.
pub(crate) fn check_total(
    resolved: &[(CartLine, Option<Product>)],
    product: &Product,
    quantity: Quantity,
) -> Result<(), CommerceError> {
    let mut line_totals = vec![product.price.times(quantity)?];
    for (line, current) in resolved {
        if line.product_id == product.id {
            continue;
        }
        if let Some(current) = current {
            line_totals.push(current.price.times(line.quantity)?);
        }
    }
    Price::total(line_totals)?;
    Ok(())
}

/// Pair each line with the product it references, if it still exists.
pub(crate) async fn resolve_lines<T: CatalogStore>(
    tx: &mut T,
    lines: Vec<CartLine>,
) -> Result<Vec<(CartLine, Option<Product>)>, CommerceError> {
    let mut resolved = Vec::with_capacity(lines.len());
    for line in lines {
        let product = tx.find_product(line.product_id).await?;
        resolved.push((line, product));
    }
    Ok(resolved)
}

/// Cart operations keyed by guest session.
#[derive(Debug, Clone)]
pub struct CartService<S> {
    store: S,
}

impl<S: Store> CartService<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch the session's cart, creating it if this is the first access.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self), fields(session = %key))]
    pub async fn get_or_create_cart(&self, key: &SessionKey) -> Result<Cart, CommerceError> {
        let mut tx = self.store.begin().await?;
        let cart = tx.create_cart(key).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Price the session's cart against the current catalog.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure, or `Invalid`
    /// if the cart total does not fit in a price.
    #[instrument(skip(self), fields(session = %key))]
    pub async fn view_cart(&self, key: &SessionKey) -> Result<CartView, CommerceError> {
        let mut tx = self.store.begin().await?;
        let cart = tx.create_cart(key).await?;
        let lines = tx.cart_lines(cart.id).await?;
        let resolved = resolve_lines(&mut tx, lines).await?;
        tx.commit().await?;

        let view = CartView::build(cart.id, resolved.iter().map(|(l, p)| (l, p.as_ref())))?;
        if view.items.len() < resolved.len() {
            debug!(
                dropped = resolved.len() - view.items.len(),
                "cart lines reference deleted products"
            );
        }
        Ok(view)
    }

    /// Add `quantity` of a product, merging into an existing line.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the product does not exist
    /// - `Inactive` if the product is disabled
    /// - `InsufficientStock` if the merged quantity exceeds stock
    /// - `Invalid` if the merged quantity or the cart total overflows
    #[instrument(skip(self), fields(session = %key, product_id = %product_id, quantity = %quantity))]
    pub async fn add_item(
        &self,
        key: &SessionKey,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartLineView, CommerceError> {
        let mut tx = self.store.begin().await?;

        let product = tx
            .find_product(product_id)
            .await?
            .ok_or(CommerceError::NotFound(Resource::Product))?;
        if !product.is_active {
            return Err(CommerceError::Inactive(product.id));
        }
        check_stock(&product, quantity)?;

        let cart = tx.create_cart(key).await?;
        let target = match tx.find_line_for_product(cart.id, product.id).await? {
            Some(existing) => {
                let merged = existing.quantity.checked_add(quantity).ok_or_else(|| {
                    CommerceError::Invalid("cart quantity is too large".to_owned())
                })?;
                check_stock(&product, merged)?;
                merged
            }
            None => quantity,
        };
        let lines = tx.cart_lines(cart.id).await?;
        check_total(&resolve_lines(&mut tx, lines).await?, &product, target)?;

        let line = tx.upsert_line(cart.id, product.id, target).await?;
        tx.commit().await?;

        debug!(line_id = %line.id, quantity = %line.quantity, "cart line saved");
        Ok(CartLineView::new(&line, &product)?)
    }

    /// Overwrite the quantity of one of the session's lines.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the line is not in this session's cart, or its
    ///   product has been deleted
    /// - `InsufficientStock` if `quantity` exceeds stock
    /// - `Invalid` if the cart total would overflow
    #[instrument(skip(self), fields(session = %key, line_id = %line_id, quantity = %quantity))]
    pub async fn update_item(
        &self,
        key: &SessionKey,
        line_id: CartLineId,
        quantity: Quantity,
    ) -> Result<CartLineView, CommerceError> {
        let mut tx = self.store.begin().await?;

        let cart = tx
            .find_cart_by_session(key)
            .await?
            .ok_or(CommerceError::NotFound(Resource::CartItem))?;
        let line = tx
            .find_line(cart.id, line_id)
            .await?
            .ok_or(CommerceError::NotFound(Resource::CartItem))?;
        let product = tx
            .find_product(line.product_id)
            .await?
            .ok_or(CommerceError::NotFound(Resource::Product))?;
        check_stock(&product, quantity)?;
        let lines = tx.cart_lines(cart.id).await?;
        check_total(&resolve_lines(&mut tx, lines).await?, &product, quantity)?;

        let line = tx.upsert_line(cart.id, product.id, quantity).await?;
        tx.commit().await?;

        Ok(CartLineView::new(&line, &product)?)
    }

    /// Delete one of the session's lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the line is not in this session's cart.
    #[instrument(skip(self), fields(session = %key, line_id = %line_id))]
    pub async fn remove_item(
        &self,
        key: &SessionKey,
        line_id: CartLineId,
    ) -> Result<(), CommerceError> {
        let mut tx = self.store.begin().await?;

        let cart = tx
            .find_cart_by_session(key)
            .await?
            .ok_or(CommerceError::NotFound(Resource::CartItem))?;
        if !tx.delete_line(cart.id, line_id).await? {
            return Err(CommerceError::NotFound(Resource::CartItem));
        }
        tx.commit().await?;
        Ok(())
    }

    /// Delete every line in the session's cart. Succeeds on an empty or
    /// missing cart.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self), fields(session = %key))]
    pub async fn clear_cart(&self, key: &SessionKey) -> Result<(), CommerceError> {
        let mut tx = self.store.begin().await?;

        let Some(cart) = tx.find_cart_by_session(key).await? else {
            return Ok(());
        };
        let removed = tx.delete_all_lines(cart.id).await?;
        tx.commit().await?;

        debug!(removed, "cart cleared");
        Ok(())
    }
}
