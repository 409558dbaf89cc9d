//! Integration tests for Corner Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process HTTP tests against the in-memory store
//! cargo test -p corner-shop-integration-tests
//!
//! # Include the PostgreSQL-backed tests (needs a migrated database)
//! DATABASE_URL=postgres://... cargo test -p corner-shop-integration-tests -- --ignored
//! ```
//!
//! Requests go through the full router (`tower::ServiceExt::oneshot`), so
//! extractors, error rendering and middleware are exercised exactly as the
//! server runs them, without binding a port.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use corner_shop_storefront::config::StorefrontConfig;
use corner_shop_storefront::db::{MemoryStore, Store};
use corner_shop_storefront::middleware::SESSION_HEADER;
use corner_shop_storefront::routes;
use corner_shop_storefront::state::AppState;

/// Admin key configured on every test app.
pub const ADMIN_KEY: &str = "test-admin-key-0123456789-abcdefghijklmnop";

/// A response reduced to what the tests assert on.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// An application under test.
pub struct TestApp<S> {
    router: Router,
    pub store: S,
}

impl TestApp<MemoryStore> {
    /// App over a fresh in-memory store with the admin key configured.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MemoryStore::new(), config_with_admin_key())
    }
}

impl Default for TestApp<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> TestApp<S> {
    /// App over `store` with an explicit configuration.
    #[must_use]
    pub fn with_config(store: S, config: StorefrontConfig) -> Self {
        let router = routes::app(AppState::new(config, store.clone()));
        Self { router, store }
    }

    /// Send a request and collect the JSON body (`Value::Null` when empty).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        session: Option<&str>,
        admin_token: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(SESSION_HEADER, session);
        }
        if let Some(token) = admin_token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse { status, body }
    }

    /// Anonymous GET.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None, None).await
    }

    /// GET in a guest session.
    pub async fn get_as(&self, session: &str, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(session), None, None).await
    }

    /// Request with a JSON body in a guest session.
    pub async fn json_as(
        &self,
        method: Method,
        session: &str,
        uri: &str,
        body: &Value,
    ) -> TestResponse {
        self.send(method, uri, Some(session), None, Some(body)).await
    }

    /// Request with the configured admin key.
    pub async fn admin(&self, method: Method, uri: &str, body: Option<&Value>) -> TestResponse {
        self.send(method, uri, None, Some(ADMIN_KEY), body).await
    }

    /// Create a product through the admin API and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the product is not created.
    pub async fn create_product(&self, body: &Value) -> i64 {
        let response = self.admin(Method::POST, "/products", Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().expect("product id")
    }
}

/// Default configuration plus [`ADMIN_KEY`].
#[must_use]
pub fn config_with_admin_key() -> StorefrontConfig {
    StorefrontConfig {
        admin_api_key: Some(SecretString::from(ADMIN_KEY)),
        ..StorefrontConfig::default()
    }
}
