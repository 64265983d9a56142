//! Rakhshan storefront library.
//!
//! Catalog browsing, cart state and checkout against the Rakhshan REST
//! backend. The command-line binary and the integration tests drive it
//! through [`state::StorefrontContext`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;

pub use error::AppError;
pub use state::StorefrontContext;
