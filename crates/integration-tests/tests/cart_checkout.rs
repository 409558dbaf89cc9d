//! Guest cart and checkout flows over HTTP, against the in-memory store.

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use corner_shop_integration_tests::TestApp;
use corner_shop_storefront::db::MemoryStore;

fn guest() -> Value {
    json!({
        "guest_name": "Ada Lovelace",
        "guest_email": "ada@example.com",
        "guest_phone": "+44 20 7946 0958",
    })
}

async fn add(app: &TestApp<MemoryStore>, session: &str, product: i64, quantity: i32) -> Value {
    let response = app
        .json_as(
            Method::POST,
            session,
            "/cart/items",
            &json!({ "product_id": product, "quantity": quantity }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    assert_eq!(app.get("/health").await.status, StatusCode::OK);
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_new_session_gets_empty_cart() {
    let app = TestApp::new();
    let response = app.get_as("fresh", "/cart").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"], json!([]));
    assert_eq!(response.body["total_items"], 0);
    assert_eq!(response.body["total_price"], 0);
}

#[tokio::test]
async fn test_adding_same_product_merges_lines() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500, "stock": 10 }))
        .await;

    let first = add(&app, "s1", mug, 2).await;
    let second = add(&app, "s1", mug, 3).await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["quantity"], 5);
    assert_eq!(second["line_total"], 2500);

    let cart = app.get_as("s1", "/cart").await.body;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["total_items"], 5);
    assert_eq!(cart["total_price"], 2500);
}

#[tokio::test]
async fn test_quantity_defaults_to_one() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500 }))
        .await;

    let response = app
        .json_as(Method::POST, "s1", "/cart/items", &json!({ "product_id": mug }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["quantity"], 1);
}

#[tokio::test]
async fn test_merge_beyond_stock_is_rejected() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500, "stock": 3 }))
        .await;

    add(&app, "s1", mug, 2).await;
    let response = app
        .json_as(
            Method::POST,
            "s1",
            "/cart/items",
            &json!({ "product_id": mug, "quantity": 2 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["detail"].is_string());

    // The earlier line is untouched
    let cart = app.get_as("s1", "/cart").await.body;
    assert_eq!(cart["total_items"], 2);
}

#[tokio::test]
async fn test_adding_unknown_or_inactive_product() {
    let app = TestApp::new();
    let hidden = app
        .create_product(&json!({ "name": "Hidden", "price": 100, "is_active": false }))
        .await;

    let missing = app
        .json_as(Method::POST, "s1", "/cart/items", &json!({ "product_id": 999 }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let inactive = app
        .json_as(Method::POST, "s1", "/cart/items", &json!({ "product_id": hidden }))
        .await;
    assert_eq!(inactive.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_quantity_is_unprocessable() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500 }))
        .await;

    let response = app
        .json_as(
            Method::POST,
            "s1",
            "/cart/items",
            &json!({ "product_id": mug, "quantity": 0 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["detail"].is_string());
}

#[tokio::test]
async fn test_cart_total_too_large_is_rejected() {
    let app = TestApp::new();
    let vault = app
        .create_product(&json!({ "name": "Vault", "price": i64::MAX / 2 + 1 }))
        .await;

    let response = app
        .json_as(
            Method::POST,
            "s1",
            "/cart/items",
            &json!({ "product_id": vault, "quantity": 2 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["detail"], "cart total is too large");
    assert_eq!(app.get_as("s1", "/cart").await.body["total_items"], 0);
}

#[tokio::test]
async fn test_update_and_remove_line() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500, "stock": 10 }))
        .await;
    let line = add(&app, "s1", mug, 2).await["id"].as_i64().unwrap_or_default();

    let updated = app
        .json_as(
            Method::PUT,
            "s1",
            &format!("/cart/items/{line}"),
            &json!({ "quantity": 7 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["quantity"], 7);

    let too_many = app
        .json_as(
            Method::PUT,
            "s1",
            &format!("/cart/items/{line}"),
            &json!({ "quantity": 11 }),
        )
        .await;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);

    let removed = app
        .send(
            Method::DELETE,
            &format!("/cart/items/{line}"),
            Some("s1"),
            None,
            None,
        )
        .await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get_as("s1", "/cart").await.body["total_items"], 0);
}

#[tokio::test]
async fn test_sessions_cannot_touch_each_others_lines() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500 }))
        .await;
    let line = add(&app, "alice", mug, 1).await["id"].as_i64().unwrap_or_default();

    let response = app
        .send(
            Method::DELETE,
            &format!("/cart/items/{line}"),
            Some("mallory"),
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get_as("alice", "/cart").await.body["total_items"], 1);
    assert_eq!(app.get_as("mallory", "/cart").await.body["total_items"], 0);
}

#[tokio::test]
async fn test_session_from_query_and_default() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500 }))
        .await;

    // No header and no query parameter share the default session
    let response = app
        .send(
            Method::POST,
            "/cart/items",
            None,
            None,
            Some(&json!({ "product_id": mug })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.get("/cart").await.body["total_items"], 1);
    assert_eq!(app.get("/cart?session_id=default").await.body["total_items"], 1);
    assert_eq!(app.get("/cart?session_id=other").await.body["total_items"], 0);
}

#[tokio::test]
async fn test_clear_cart() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500 }))
        .await;
    add(&app, "s1", mug, 4).await;

    let response = app
        .send(Method::DELETE, "/cart", Some("s1"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get_as("s1", "/cart").await.body["total_items"], 0);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_snapshots_cart_into_order() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500, "stock": 10 }))
        .await;
    let tea = app
        .create_product(&json!({ "name": "Tea", "price": 300 }))
        .await;
    add(&app, "s1", mug, 2).await;
    add(&app, "s1", tea, 1).await;

    let placed = app.json_as(Method::POST, "s1", "/orders", &guest()).await;
    assert_eq!(placed.status, StatusCode::CREATED, "{:?}", placed.body);
    assert_eq!(placed.body["total_price"], 1300);
    assert_eq!(placed.body["total_items"], 3);
    assert_eq!(placed.body["status"], "pending");
    assert_eq!(placed.body["guest_email"], "ada@example.com");
    assert_eq!(placed.body["items"].as_array().map(Vec::len), Some(2));

    // Cart emptied by the same transaction
    assert_eq!(app.get_as("s1", "/cart").await.body["total_items"], 0);

    let order_id = placed.body["id"].as_i64().unwrap_or_default();
    let shown = app.get(&format!("/orders/{order_id}")).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["total_price"], 1300);

    let items = app.get(&format!("/orders/{order_id}/items")).await;
    assert_eq!(items.status, StatusCode::OK);
    assert_eq!(items.body[0]["product_name"], "Mug");
    assert_eq!(items.body[0]["line_total"], 1000);
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let app = TestApp::new();

    let response = app.json_as(Method::POST, "s1", "/orders", &guest()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["detail"], "cannot create order from empty cart");

    let orders = app.admin(Method::GET, "/orders", None).await;
    assert_eq!(orders.body, json!([]));
}

#[tokio::test]
async fn test_checkout_rejects_bad_contact_details() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500 }))
        .await;
    add(&app, "s1", mug, 1).await;

    let mut body = guest();
    body["guest_email"] = json!("not-an-email");
    let response = app.json_as(Method::POST, "s1", "/orders", &body).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was consumed
    assert_eq!(app.get_as("s1", "/cart").await.body["total_items"], 1);
}

#[tokio::test]
async fn test_failed_commit_keeps_cart_for_retry() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500 }))
        .await;
    add(&app, "s1", mug, 2).await;

    app.store.fail_next_commit();
    let failed = app.json_as(Method::POST, "s1", "/orders", &guest()).await;
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.get_as("s1", "/cart").await.body["total_items"], 2);

    let retried = app.json_as(Method::POST, "s1", "/orders", &guest()).await;
    assert_eq!(retried.status, StatusCode::CREATED);
    assert_eq!(retried.body["total_price"], 1000);
}

#[tokio::test]
async fn test_order_survives_product_deletion() {
    let app = TestApp::new();
    let mug = app
        .create_product(&json!({ "name": "Mug", "price": 500 }))
        .await;
    add(&app, "s1", mug, 1).await;
    let placed = app.json_as(Method::POST, "s1", "/orders", &guest()).await;
    let order_id = placed.body["id"].as_i64().unwrap_or_default();

    let deleted = app
        .admin(Method::DELETE, &format!("/products/{mug}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let shown = app.get(&format!("/orders/{order_id}")).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["total_price"], 500);
    assert_eq!(shown.body["items"][0]["quantity"], 1);
    assert_eq!(shown.body["items"][0]["product_name"], Value::Null);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let app = TestApp::new();
    assert_eq!(app.get("/orders/42").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/orders/42/items").await.status, StatusCode::NOT_FOUND);
}
