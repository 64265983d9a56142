//! Rakhshan admin console library.
//!
//! Authenticated product and order management against the Rakhshan REST
//! backend. The command-line binary drives it through
//! [`state::AdminContext`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod orders;
pub mod products;
pub mod session;
pub mod state;
pub mod uploads;

pub use client::{AdminApiError, AdminClient};
pub use error::AdminError;
pub use state::AdminContext;
