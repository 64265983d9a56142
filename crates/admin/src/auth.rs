//! Admin authentication.
//!
//! Exchanges a username and password for a bearer token at `POST /auth/login`.

use rakhshan_storefront::api::{ApiError, send};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::client::AdminApiError;

/// Message used when the backend refuses the credentials.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Message used when a successful login carries no token.
pub const INVALID_RESPONSE: &str = "Invalid response from server";

/// Bearer token obtained from a login.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Token sent as `Authorization: Bearer ...`.
    pub access_token: SecretString,
    /// Token type reported by the backend (normally `bearer`).
    pub token_type: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Log in with a username and password.
///
/// The credentials are sent form-encoded.
///
/// # Errors
///
/// Returns `AdminApiError::AuthenticationFailed` if the credentials are
/// rejected or the response holds no token, or `AdminApiError::Api` for
/// other failures.
#[instrument(skip(client, url, password), fields(username = %username))]
pub async fn login(
    client: &reqwest::Client,
    url: Url,
    username: &str,
    password: &SecretString,
) -> Result<AccessToken, AdminApiError> {
    let request = client
        .post(url)
        .form(&[("username", username), ("password", password.expose_secret())]);

    let body = match send(client, request).await {
        Ok(body) => body,
        Err(ApiError::Status {
            status: 401 | 403, ..
        }) => {
            tracing::warn!("Admin login rejected");
            return Err(AdminApiError::AuthenticationFailed(INVALID_CREDENTIALS.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    parse_login_response(&body)
}

fn parse_login_response(body: &str) -> Result<AccessToken, AdminApiError> {
    let invalid = || AdminApiError::AuthenticationFailed(INVALID_RESPONSE.to_string());

    let response: LoginResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!(error = %e, "Login response was not JSON");
        invalid()
    })?;
    let token = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(invalid)?;

    Ok(AccessToken {
        access_token: SecretString::from(token),
        token_type: response.token_type.unwrap_or_else(|| "bearer".to_string()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token() {
        let token = parse_login_response(r#"{"access_token": "abc.def", "token_type": "bearer"}"#).unwrap();
        assert_eq!(token.access_token.expose_secret(), "abc.def");
        assert_eq!(token.token_type, "bearer");
        assert!(!format!("{token:?}").contains("abc.def"));
    }

    #[test]
    fn test_missing_token_is_auth_failure() {
        for body in [r#"{"token_type": "bearer"}"#, r#"{"access_token": ""}"#, "ok"] {
            let err = parse_login_response(body).unwrap_err();
            assert!(matches!(err, AdminApiError::AuthenticationFailed(ref m) if m == INVALID_RESPONSE));
        }
    }
}
