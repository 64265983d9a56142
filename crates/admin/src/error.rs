//! Unified error handling with Sentry integration.

use thiserror::Error;

use crate::client::AdminApiError;
use crate::config::ConfigError;
use crate::products::ProductFormError;
use crate::session::SessionError;
use crate::uploads::UploadError;
use rakhshan_storefront::api::ApiError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Admin API operation failed.
    #[error("API error: {0}")]
    Api(#[from] AdminApiError),

    /// Product form rejected.
    #[error("Product form error: {0}")]
    ProductForm(#[from] ProductFormError),

    /// Upload rejected before sending.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Session file could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

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

/// Result alias for admin operations.
pub type Result<T, E = AdminError> = std::result::Result<T, E>;

impl From<ApiError> for AdminError {
    fn from(err: ApiError) -> Self {
        Self::Api(AdminApiError::Api(err))
    }
}

impl AdminError {
    /// Whether the failure lies outside the admin's control.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Api(e) => e.is_server_fault(),
            Self::Session(_) => true,
            _ => false,
        }
    }

    /// Text suitable for showing to the admin.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(AdminApiError::AuthenticationFailed(msg) | AdminApiError::UploadFailed(msg)) => {
                msg.clone()
            }
            Self::Api(AdminApiError::NoAccessToken) => "You are not logged in. Please log in first.".to_string(),
            Self::Api(AdminApiError::Api(ApiError::Status {
                status: 401 | 403, ..
            })) => "Your session has expired. Please log in again.".to_string(),
            Self::Api(AdminApiError::Api(ApiError::NotFound(what))) | Self::NotFound(what) => {
                format!("Could not find {what}")
            }
            Self::Api(AdminApiError::Api(ApiError::Status { status, message })) if *status < 500 => {
                message.clone()
            }
            Self::Api(AdminApiError::Api(ApiError::Http(_) | ApiError::Url(_))) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Api(AdminApiError::Api(ApiError::Status { .. } | ApiError::Parse(_))) => {
                "The server is having trouble right now. Please try again later.".to_string()
            }
            Self::ProductForm(e) => e.to_string(),
            Self::Upload(e) => e.to_string(),
            Self::Session(e) => format!("Could not access the saved session: {e}"),
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
                "Admin error"
            );
        } else {
            tracing::debug!(error = %self, "Admin request rejected");
        }
    }
}
