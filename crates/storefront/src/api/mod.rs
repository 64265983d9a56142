//! REST API client for the storefront backend.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`; the backend is the source of truth
//!   for products, pricing and orders
//! - In-memory caching of product reads via `moka` (configurable TTL)
//! - Every request carries an `x-request-id` header for log correlation
//!
//! # Endpoints
//!
//! - `GET /products`, `GET /products/{id}`
//! - `POST /orders`
//!
//! # Example
//!
//! ```rust,ignore
//! use rakhshan_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api);
//! let products = client.list_products().await?;
//! ```

mod cache;
mod client;

pub use client::{ApiClient, OrderConfirmation};

use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum number of body characters kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, TLS, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Human-readable message extracted from the response body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of a rejected request, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Whether the failure lies with the backend or the network rather than
    /// with the request itself.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound(_) => false,
            Self::Http(_) | Self::Parse(_) | Self::Url(_) => true,
        }
    }
}

/// Send a request and return the raw body of a successful response.
///
/// # Errors
///
/// Returns `ApiError::Http` on transport failure and `ApiError::Status` for
/// non-2xx responses.
pub async fn send(client: &reqwest::Client, builder: reqwest::RequestBuilder) -> Result<String, ApiError> {
    let mut request = builder.build()?;
    let request_id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let span = tracing::debug_span!(
        "api_request",
        method = %request.method(),
        url = %request.url(),
        request_id = %request_id,
    );

    async move {
        let response = client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            if status.is_server_error() {
                tracing::error!(status = %status, message = %message, "Backend returned server error");
            } else {
                tracing::debug!(status = %status, message = %message, "Backend rejected request");
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(status = %status, bytes = body.len(), "Backend responded");
        Ok(body)
    }
    .instrument(span)
    .await
}

/// Send a request and parse the JSON body of a successful response.
///
/// # Errors
///
/// Everything [`send`] returns, plus `ApiError::Parse` for malformed bodies.
pub async fn send_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    builder: reqwest::RequestBuilder,
) -> Result<T, ApiError> {
    let body = send(client, builder).await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(&body, 500),
            "Failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract a human-readable message from an error response.
///
/// Looks at a `detail` field (a string, or a list of `{msg}` validation
/// entries), then `message`, then the raw body, then the status reason.
#[must_use]
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        match parsed.detail {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => return detail,
            Some(serde_json::Value::Array(entries)) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
        if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        truncate(trimmed, ERROR_BODY_LIMIT)
    }
}

fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
