//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness
//! GET    /health/ready            - Store round trip (503 on failure)
//!
//! # Products
//! GET    /products                - List (skip, limit, category, active_only)
//! GET    /products/categories     - Distinct categories
//! GET    /products/{id}           - Product detail
//! POST   /products                - Create (admin)
//! PUT    /products/{id}           - Partial update (admin)
//! DELETE /products/{id}           - Delete (admin)
//!
//! # Cart (keyed by x-session-id / ?session_id)
//! GET    /cart                    - Priced cart view
//! DELETE /cart                    - Clear
//! POST   /cart/items              - Add or merge a line
//! PUT    /cart/items/{item_id}    - Set a line's quantity
//! DELETE /cart/items/{item_id}    - Remove a line
//!
//! # Orders
//! POST   /orders                  - Checkout
//! GET    /orders                  - List (admin)
//! GET    /orders/{id}             - Order detail
//! GET    /orders/{id}/items       - Order lines
//! ```

pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::db::Store;
use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// JSON body extractor whose rejections render as [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor whose rejections render as [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string extractor whose rejections render as [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Create the product routes router.
pub fn product_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(products::list::<S>).post(products::create::<S>))
        .route("/categories", get(products::categories::<S>))
        .route(
            "/{id}",
            get(products::show::<S>)
                .put(products::update::<S>)
                .delete(products::delete::<S>),
        )
}

/// Create the cart routes router.
pub fn cart_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(cart::show::<S>).delete(cart::clear::<S>))
        .route("/items", post(cart::add_item::<S>))
        .route(
            "/items/{item_id}",
            put(cart::update_item::<S>).delete(cart::remove_item::<S>),
        )
}

/// Create the order routes router.
pub fn order_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(orders::list::<S>).post(orders::place::<S>))
        .route("/{id}", get(orders::show::<S>))
        .route("/{id}/items", get(orders::items::<S>))
}

/// Create all API routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
}

/// Build the full application: health checks, API routes, request IDs and
/// request tracing. Sentry layers are added by the binary.
pub fn app<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness::<S>))
        .merge(routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness<S: Store>(State(state): State<AppState<S>>) -> StatusCode {
    match state.store().health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
