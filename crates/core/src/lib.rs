//! Corner Shop Core - Shared value types.
//!
//! This crate provides the value types used across all Corner Shop components:
//! - `storefront` - Guest checkout API (catalog, cart, orders)
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//! The optional `postgres` feature adds sqlx encode/decode impls.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, guest contact
//!   details, session keys, order statuses and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
