//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` so the PostgreSQL store can decode them
//! directly; view types are what the HTTP layer serializes.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartLine, CartLineView, CartView};
pub use order::{
    GuestInfo, NewOrder, NewOrderLine, Order, OrderLine, OrderLineView, OrderSummary, OrderView,
};
pub use product::{NewProduct, Product, ProductChanges, ProductFilter};
