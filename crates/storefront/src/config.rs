//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RAKHSHAN_API_URL` - Base URL of the REST backend (e.g., <https://api.rakhshan.pk/>)
//!
//! ## Optional
//! - `RAKHSHAN_CART_PATH` - Cart snapshot file (default: `<data dir>/rakhshan/cart.json`)
//! - `RAKHSHAN_CATALOG_CACHE_TTL_SECS` - Product cache lifetime, `0` disables (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable holding the backend base URL.
pub const API_URL_VAR: &str = "RAKHSHAN_API_URL";

const DEFAULT_CACHE_TTL_SECS: &str = "300";
const CART_FILE_NAME: &str = "cart.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST backend settings
    pub api: ApiConfig,
    /// Location of the persisted cart slot
    pub cart_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
    /// How long product reads stay cached; zero disables the cache
    pub catalog_cache_ttl: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(vars: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api = ApiConfig::from_vars(&vars)?;
        let cart_path = get_optional_env(&vars, "RAKHSHAN_CART_PATH")
            .map_or_else(|| default_data_dir().join(CART_FILE_NAME), PathBuf::from);

        Ok(Self {
            api,
            cart_path,
            sentry_dsn: get_optional_env(&vars, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&vars, "SENTRY_ENVIRONMENT"),
        })
    }
}

impl ApiConfig {
    /// Build an API configuration for `base_url` with caching disabled.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(API_URL_VAR, base_url)?,
            catalog_cache_ttl: Duration::ZERO,
        })
    }

    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(API_URL_VAR, &get_required_env(vars, API_URL_VAR)?)?;
        let ttl_secs = get_env_or_default(
            vars,
            "RAKHSHAN_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("RAKHSHAN_CATALOG_CACHE_TTL_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

/// Directory holding the storefront's local slots.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rakhshan")
}

/// Parse a base URL, forcing a trailing slash.
///
/// Without it `Url::join` would replace the last path segment instead of
/// appending to it.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value is not an http(s) URL.
pub fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    vars(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    vars(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(vars: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(vars, key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_url() {
        let err = StorefrontConfig::from_vars(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == API_URL_VAR));
    }

    #[test]
    fn test_defaults() {
        let config =
            StorefrontConfig::from_vars(lookup(&[(API_URL_VAR, "https://api.example.com")])).unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://api.example.com/");
        assert_eq!(config.api.catalog_cache_ttl, Duration::from_secs(300));
        assert!(config.cart_path.ends_with("rakhshan/cart.json"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_vars(lookup(&[
            (API_URL_VAR, "http://localhost:8000/api"),
            ("RAKHSHAN_CART_PATH", "/tmp/cart.json"),
            ("RAKHSHAN_CATALOG_CACHE_TTL_SECS", "0"),
            ("SENTRY_ENVIRONMENT", "staging"),
        ]))
        .unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8000/api/");
        assert_eq!(config.api.catalog_cache_ttl, Duration::ZERO);
        assert_eq!(config.cart_path, PathBuf::from("/tmp/cart.json"));
        assert_eq!(config.sentry_environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_invalid_values() {
        let err = StorefrontConfig::from_vars(lookup(&[(API_URL_VAR, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = StorefrontConfig::from_vars(lookup(&[(API_URL_VAR, "ftp://files.example.com")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = StorefrontConfig::from_vars(lookup(&[
            (API_URL_VAR, "https://api.example.com"),
            ("RAKHSHAN_CATALOG_CACHE_TTL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "RAKHSHAN_CATALOG_CACHE_TTL_SECS"));
    }

    #[test]
    fn test_base_url_join() {
        let url = parse_base_url(API_URL_VAR, "http://localhost:8000/api").unwrap();
        assert_eq!(url.join("products").unwrap().as_str(), "http://localhost:8000/api/products");
    }
}
