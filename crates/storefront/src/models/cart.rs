//! Cart types and the priced cart view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use corner_shop_core::{CartId, CartLineId, Price, PriceError, ProductId, Quantity, SessionKey};

use super::product::Product;

/// A guest cart, one per session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub session_key: SessionKey,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product in a cart. At most one line exists per (cart, product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with the live catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub product_name: String,
    pub product_price: Price,
    /// `product_price * quantity`
    pub line_total: Price,
}

impl CartLineView {
    /// Price a line against its product.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the line total does not fit.
    pub fn new(line: &CartLine, product: &Product) -> Result<Self, PriceError> {
        Ok(Self {
            id: line.id,
            cart_id: line.cart_id,
            product_id: line.product_id,
            quantity: line.quantity,
            product_name: product.name.clone(),
            product_price: product.price,
            line_total: product.price.times(line.quantity)?,
        })
    }
}

/// A cart with every line priced and totalled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartLineView>,
    pub total_items: i64,
    pub total_price: Price,
}

impl CartView {
    /// Build the view from lines paired with whatever product they resolve to.
    ///
    /// Lines whose product no longer exists are left out of the items and
    /// of both totals.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if a line total or the cart total
    /// does not fit.
    pub fn build<'a, I>(cart_id: CartId, lines: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = (&'a CartLine, Option<&'a Product>)>,
    {
        let items = lines
            .into_iter()
            .filter_map(|(line, product)| product.map(|p| CartLineView::new(line, p)))
            .collect::<Result<Vec<_>, _>>()?;

        let total_items = items.iter().map(|item| i64::from(item.quantity.get())).sum();
        let total_price = Price::total(items.iter().map(|item| item.line_total))?;

        Ok(Self {
            id: cart_id,
            items,
            total_items,
            total_price,
        })
    }

    /// Whether the cart has no priced lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::product::fixtures::product;

    fn line(id: i32, product_id: i32, quantity: i32) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            cart_id: CartId::new(1),
            product_id: ProductId::new(product_id),
            quantity: Quantity::new(quantity).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total() {
        let mug = product(1, "Mug", 500, Some(3));
        let view = CartLineView::new(&line(10, 1, 2), &mug).unwrap();
        assert_eq!(view.product_name, "Mug");
        assert_eq!(view.line_total.minor_units(), 1000);
    }

    #[test]
    fn test_totals() {
        let mug = product(1, "Mug", 500, Some(3));
        let tea = product(2, "Tea", 300, None);
        let lines = [line(10, 1, 2), line(11, 2, 1)];

        let view = CartView::build(
            CartId::new(1),
            [(&lines[0], Some(&mug)), (&lines[1], Some(&tea))],
        )
        .unwrap();

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.total_items, 3);
        assert_eq!(view.total_price.minor_units(), 1300);
    }

    #[test]
    fn test_unresolved_lines_are_dropped_from_totals() {
        let mug = product(1, "Mug", 500, Some(3));
        let lines = [line(10, 1, 1), line(11, 99, 4)];

        let view =
            CartView::build(CartId::new(1), [(&lines[0], Some(&mug)), (&lines[1], None)]).unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total_items, 1);
        assert_eq!(view.total_price.minor_units(), 500);
    }

    #[test]
    fn test_empty_cart() {
        let view =
            CartView::build(CartId::new(1), Vec::<(&CartLine, Option<&Product>)>::new()).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.total_items, 0);
        assert_eq!(view.total_price, Price::ZERO);
    }

    #[test]
    fn test_total_too_large_for_price() {
        let huge = product(1, "Huge", i64::MAX / 2, None);
        let lines = [line(10, 1, 3)];
        assert_eq!(CartLineView::new(&lines[0], &huge), Err(PriceError::Overflow));

        let half = product(2, "Half", i64::MAX / 2 + 1, None);
        let lines = [line(11, 2, 1), line(12, 2, 1)];
        let result = CartView::build(
            CartId::new(1),
            [(&lines[0], Some(&half)), (&lines[1], Some(&half))],
        );
        assert_eq!(result, Err(PriceError::Overflow));
    }
}
