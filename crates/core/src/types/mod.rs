//! Core types for Rakhshan.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod quantity;
pub mod selection;
pub mod status;

pub use cart::{CartLineItem, LineKey};
pub use id::*;
pub use order::{NewOrder, Order, OrderItem};
pub use price::{Price, PriceError};
pub use product::{Product, ProductInput};
pub use quantity::{Quantity, QuantityError};
pub use selection::NOT_APPLICABLE;
pub use status::*;
