//! Command implementations.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod shop;

use rakhshan_admin::AdminError;
use rakhshan_storefront::AppError;
use rakhshan_storefront::config::ConfigError;
use thiserror::Error;

/// Errors surfaced by a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Storefront(#[from] AppError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Invalid command-line input.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub fn config(err: ConfigError) -> Self {
        Self::Storefront(AppError::Config(err))
    }

    /// Text printed to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storefront(e) => e.user_message(),
            Self::Admin(e) => e.user_message(),
            Self::Usage(msg) => msg.clone(),
        }
    }

    /// Log the error, capturing server-side faults to Sentry.
    pub fn report(&self) {
        match self {
            Self::Storefront(e) => e.report(),
            Self::Admin(e) => e.report(),
            Self::Usage(msg) => tracing::debug!(message = %msg, "Invalid command"),
        }
    }
}

/// Convert a 1-based line number from the command line to a cart index.
pub fn line_index(line: usize) -> Result<usize, CliError> {
    line.checked_sub(1)
        .ok_or_else(|| CliError::Usage("Line numbers start at 1".to_string()))
}
