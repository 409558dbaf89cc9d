//! HTTP middleware and extractors for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fills the span field, echoes `x-request-id`)
//!
//! # Extractors
//!
//! - [`GuestSession`] - the caller's cart session key
//! - [`RequireAdmin`] / [`OptionalAdmin`] - bearer-token admin check

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAdmin, RequireAdmin};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{GuestSession, SESSION_HEADER};
