//! Rakhshan Core - Shared types library.
//!
//! This crate provides common types used across all Rakhshan components:
//! - `storefront` - Catalog browsing, cart state and checkout
//! - `admin` - Product and order management console
//! - `cli` - Command-line front end for both
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! The REST backend owns persistence and pricing; these types mirror its
//! JSON shapes and carry the client-side invariants (quantity floor,
//! non-negative prices, explicit size/color selection).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities and statuses,
//!   plus the product, cart line and order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
