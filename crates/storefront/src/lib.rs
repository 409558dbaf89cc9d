//! Corner Shop storefront library.
//!
//! Guest-checkout commerce backend: product catalog, session-keyed carts and
//! atomic cart-to-order checkout, served over a JSON HTTP API. Exposed as a
//! library so the CLI and the integration tests can reuse the store, the
//! services and the router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
