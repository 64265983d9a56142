//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RAKHSHAN_API_URL` - Base URL of the REST backend
//!
//! ## Optional
//! - `RAKHSHAN_ADMIN_SESSION_PATH` - Session token file (default: `<data dir>/rakhshan/admin-session.json`)
//! - `RAKHSHAN_MAX_UPLOAD_IMAGES` - Images allowed per product (default: 5)
//! - `RAKHSHAN_MAX_UPLOAD_BYTES` - Size limit per image (default: 5 MiB)
//! - `RAKHSHAN_ADMIN_PASSWORD` - Password used by non-interactive login
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;

use rakhshan_storefront::config::{API_URL_VAR, default_data_dir, parse_base_url};
use secrecy::SecretString;
use url::Url;

pub use rakhshan_storefront::config::ConfigError;

const SESSION_FILE_NAME: &str = "admin-session.json";
const DEFAULT_MAX_UPLOAD_IMAGES: usize = 5;
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Admin console configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the REST backend
    pub api_base_url: Url,
    /// Location of the persisted session token
    pub session_path: PathBuf,
    /// Image upload limits
    pub uploads: UploadConfig,
    /// Password for non-interactive login (redacted in Debug)
    pub admin_password: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Image upload limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadConfig {
    /// Maximum images per product, existing ones included
    pub max_images: usize,
    /// Maximum size of a single image in bytes
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_images: DEFAULT_MAX_UPLOAD_IMAGES,
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(vars: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = get_optional_env(&vars, API_URL_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(API_URL_VAR.to_string()))?;
        let api_base_url = parse_base_url(API_URL_VAR, &raw_url)?;

        let session_path = get_optional_env(&vars, "RAKHSHAN_ADMIN_SESSION_PATH")
            .map_or_else(|| default_data_dir().join(SESSION_FILE_NAME), PathBuf::from);

        let uploads = UploadConfig {
            max_images: parse_or(&vars, "RAKHSHAN_MAX_UPLOAD_IMAGES", DEFAULT_MAX_UPLOAD_IMAGES)?,
            max_bytes: parse_or(&vars, "RAKHSHAN_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        };

        Ok(Self {
            api_base_url,
            session_path,
            uploads,
            admin_password: get_optional_env(&vars, "RAKHSHAN_ADMIN_PASSWORD").map(SecretString::from),
            sentry_dsn: get_optional_env(&vars, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&vars, "SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_optional_env(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    vars(key).filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(vars: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(vars, key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
