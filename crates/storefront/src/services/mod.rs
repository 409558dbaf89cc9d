//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Cart aggregation keyed by guest session
//! - `checkout` - Atomic cart-to-order conversion
//! - `orders` - Order lookups
//! - `catalog` - Product reads and admin management
//!
//! Every service is generic over [`crate::db::Store`] and runs each
//! operation in a single store transaction.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod orders;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use error::{CommerceError, Resource};
pub use orders::OrderService;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    use corner_shop_core::{Price, Quantity, SessionKey};

    use crate::db::{CatalogStore, MemoryStore, Store, StoreTx};
    use crate::models::{GuestInfo, NewProduct, Product};

    pub fn qty(n: i32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    pub fn session(key: &str) -> SessionKey {
        SessionKey::parse(key).unwrap()
    }

    pub fn guest() -> GuestInfo {
        GuestInfo {
            guest_name: "Ada Lovelace".parse().unwrap(),
            guest_email: "ada@example.com".parse().unwrap(),
            guest_phone: "+44 20 7946 0958".parse().unwrap(),
        }
    }

    pub async fn seed_product(
        store: &MemoryStore,
        name: &str,
        price: i64,
        stock: Option<i32>,
    ) -> Product {
        let mut tx = store.begin().await.unwrap();
        let product = tx
            .insert_product(&NewProduct {
                name: name.to_owned(),
                description: None,
                price: Price::from_minor(price).unwrap(),
                image: None,
                stock,
                category: None,
                is_active: true,
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        product
    }
}
