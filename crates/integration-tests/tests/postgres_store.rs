//! Checkout against a real `PostgreSQL` database.
//!
//! These tests require:
//! - A running `PostgreSQL` database reachable at `DATABASE_URL`
//!
//! Migrations are applied by the test itself. Every test uses fresh product
//! names and session keys so runs do not interfere.
//!
//! Run with: cargo test -p corner-shop-integration-tests -- --ignored

use secrecy::SecretString;
use uuid::Uuid;

use corner_shop_core::{Price, Quantity, SessionKey};
use corner_shop_storefront::db::{self, PgStore};
use corner_shop_storefront::models::{GuestInfo, NewProduct};
use corner_shop_storefront::services::{
    CartService, CatalogService, CheckoutService, CommerceError, OrderService,
};

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    PgStore::new(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

fn new_product(price: i64, stock: Option<i32>) -> NewProduct {
    NewProduct {
        name: unique("product"),
        description: None,
        price: Price::from_minor(price).expect("valid price"),
        image: None,
        stock,
        category: Some("integration".to_owned()),
        is_active: true,
    }
}

fn guest() -> GuestInfo {
    serde_json::from_value(serde_json::json!({
        "guest_name": "Ada Lovelace",
        "guest_email": "ada@example.com",
        "guest_phone": "+44 20 7946 0958",
    }))
    .expect("valid guest")
}

fn qty(n: i32) -> Quantity {
    Quantity::new(n).expect("valid quantity")
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_checkout_round_trip() {
    let store = store().await;
    let catalog = CatalogService::new(store.clone());
    let carts = CartService::new(store.clone());
    let checkout = CheckoutService::new(store.clone());
    let orders = OrderService::new(store);

    let mug = catalog
        .create_product(&new_product(500, Some(10)))
        .await
        .expect("create mug");
    let tea = catalog
        .create_product(&new_product(300, None))
        .await
        .expect("create tea");

    let session = SessionKey::parse(&unique("session")).expect("valid session");
    carts.add_item(&session, mug.id, qty(2)).await.expect("add mug");
    carts.add_item(&session, tea.id, qty(1)).await.expect("add tea");
    // Merges into the existing line
    let line = carts.add_item(&session, tea.id, qty(1)).await.expect("merge tea");
    assert_eq!(line.quantity.get(), 2);

    let order = checkout
        .place_order(&session, guest())
        .await
        .expect("place order");
    assert_eq!(order.order.total_price.minor_units(), 1600);
    assert_eq!(order.order.total_items, 4);
    assert_eq!(order.items.len(), 2);

    let cart = carts.view_cart(&session).await.expect("view cart");
    assert!(cart.is_empty());

    let stored = orders.get_order(order.order.id).await.expect("get order");
    assert_eq!(stored.order.total_price.minor_units(), 1600);

    // Lines outlive the product
    catalog.delete_product(mug.id).await.expect("delete mug");
    let items = orders.order_items(order.order.id).await.expect("items");
    assert_eq!(items.len(), 2);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_duplicate_product_name_conflicts() {
    let store = store().await;
    let catalog = CatalogService::new(store);
    let product = new_product(100, None);

    catalog.create_product(&product).await.expect("first insert");
    let err = catalog.create_product(&product).await.unwrap_err();
    assert!(matches!(err, CommerceError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_empty_cart_checkout_creates_nothing() {
    let store = store().await;
    let checkout = CheckoutService::new(store);
    let session = SessionKey::parse(&unique("session")).expect("valid session");

    let err = checkout.place_order(&session, guest()).await.unwrap_err();
    assert!(matches!(err, CommerceError::EmptyCart));
}
