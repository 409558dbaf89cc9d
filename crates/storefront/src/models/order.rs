//! Guest order types.
//!
//! An order is a frozen snapshot of a cart: guest contact details, totals
//! computed at checkout, and one line per cart line. Nothing here is
//! updated after the checkout transaction commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corner_shop_core::{
    ContactName, Email, OrderId, OrderLineId, OrderStatus, PhoneNumber, Price, ProductId, Quantity,
};

use super::product::Product;

/// Contact details a guest enters at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub guest_name: ContactName,
    pub guest_email: Email,
    pub guest_phone: PhoneNumber,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub guest_name: ContactName,
    pub guest_email: Email,
    pub guest_phone: PhoneNumber,
    pub status: OrderStatus,
    pub total_price: Price,
    pub total_items: i64,
    pub created_at: DateTime<Utc>,
}

/// One frozen line of an order. The product is referenced by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Input for inserting an order row.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub guest: GuestInfo,
    pub total_price: Price,
    pub total_items: i64,
}

/// Input for inserting an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// An order line with whatever the catalog currently says about its product.
///
/// The product fields are `None` once the product has been deleted, and
/// `line_total` is also `None` if it does not fit in a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineView {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub product_name: Option<String>,
    pub product_price: Option<Price>,
    pub line_total: Option<Price>,
}

impl OrderLineView {
    /// Join a line with its product, if it still exists.
    #[must_use]
    pub fn new(line: &OrderLine, product: Option<&Product>) -> Self {
        Self {
            id: line.id,
            order_id: line.order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            product_name: product.map(|p| p.name.clone()),
            product_price: product.map(|p| p.price),
            line_total: product.and_then(|p| p.price.times(line.quantity).ok()),
        }
    }
}

/// Full order detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLineView>,
}

/// Order row for admin listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub guest_name: ContactName,
    pub guest_email: Email,
    pub status: OrderStatus,
    pub total_items: i64,
    pub total_price: Price,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            guest_name: order.guest_name,
            guest_email: order.guest_email,
            status: order.status,
            total_items: order.total_items,
            total_price: order.total_price,
            created_at: order.created_at,
        }
    }
}
