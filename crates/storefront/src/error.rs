//! Unified error handling with Sentry integration.
//!
//! `AppError` is the error type of every storefront operation that touches
//! more than one module. Server-side faults are captured to Sentry when the
//! error is reported; validation failures are only logged at debug level.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::{CartStoreError, SelectionError};
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use rakhshan_core::QuantityError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Size/color/stock choice rejected.
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Quantity could not be parsed.
    #[error("Quantity error: {0}")]
    Quantity(#[from] QuantityError),

    /// Checkout form rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// The cart slot could not be read or written.
    #[error("Cart store error: {0}")]
    CartStore(#[from] CartStoreError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Result alias for storefront operations.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

impl AppError {
    /// Whether the failure lies outside the user's control.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Api(e) => e.is_server_fault(),
            Self::CartStore(_) => true,
            _ => false,
        }
    }

    /// Text suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::NotFound(what)) | Self::NotFound(what) => {
                format!("Could not find {what}")
            }
            Self::Api(ApiError::Status { status, message }) if *status < 500 => message.clone(),
            Self::Api(ApiError::Status { .. } | ApiError::Parse(_)) => {
                "The store is having trouble right now. Please try again later.".to_string()
            }
            Self::Api(ApiError::Http(_) | ApiError::Url(_)) => {
                "Could not reach the store. Check your connection and try again.".to_string()
            }
            Self::Selection(e) => e.to_string(),
            Self::Quantity(e) => e.to_string(),
            Self::Checkout(e) => e.to_string(),
            Self::CartStore(e) => format!("Your cart could not be saved: {e}"),
            Self::Config(e) => e.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Log the error, capturing server-side faults to Sentry.
    pub fn report(&self) {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront request rejected");
        }
    }
}

/// Add a Sentry breadcrumb for debugging context.
///
/// Breadcrumbs are recorded and sent with the next error event.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
