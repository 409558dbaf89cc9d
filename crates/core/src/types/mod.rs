//! Core types for Corner Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod page;
pub mod price;
pub mod quantity;
pub mod session;
pub mod status;

pub use contact::{ContactName, ContactNameError, Email, EmailError, PhoneError, PhoneNumber};
pub use id::*;
pub use page::Page;
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
pub use session::{SessionKey, SessionKeyError};
pub use status::OrderStatus;
