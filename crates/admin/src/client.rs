//! Admin REST API client.
//!
//! Every call except [`AdminClient::login`] needs a bearer token; without one
//! it fails with [`AdminApiError::NoAccessToken`] before any network I/O.

use std::sync::Arc;

use rakhshan_core::{Order, OrderId, OrderStatus, Product, ProductId, ProductInput};
use rakhshan_storefront::api::{ApiError, send, send_json};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;

use crate::auth::{self, AccessToken};
use crate::uploads::ImageFile;

/// Message used when the upload endpoint reports partial failure.
pub const UPLOAD_FAILED: &str = "Some images failed to upload";

/// Errors that can occur when calling the admin endpoints.
#[derive(Debug, Error)]
pub enum AdminApiError {
    /// The request failed or the backend rejected it.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Login failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No token is held; log in first.
    #[error("Not logged in - admin authentication required")]
    NoAccessToken,

    /// The backend accepted the upload request but did not store every image.
    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

impl AdminApiError {
    /// Whether the failure lies with the backend or the network.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Api(e) => e.is_server_fault(),
            Self::UploadFailed(_) => true,
            Self::AuthenticationFailed(_) | Self::NoAccessToken => false,
        }
    }
}

// =============================================================================
// AdminClient
// =============================================================================

/// Client for the admin endpoints of the REST backend.
///
/// Cheaply cloneable; clones share the connection pool and the token.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: Url,
    /// In-memory token slot
    token: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    uploaded: Vec<UploadedImage>,
}

#[derive(Deserialize)]
struct UploadedImage {
    url: String,
}

impl UploadResponse {
    /// URLs of the stored images, provided all `sent` files made it.
    fn into_urls(self, sent: usize) -> Result<Vec<String>, AdminApiError> {
        if !self.success || self.uploaded.len() != sent {
            tracing::warn!(
                success = self.success,
                sent,
                uploaded = self.uploaded.len(),
                "Backend reported failed uploads"
            );
            return Err(AdminApiError::UploadFailed(UPLOAD_FAILED.to_string()));
        }
        Ok(self.uploaded.into_iter().map(|image| image.url).collect())
    }
}

impl AdminClient {
    /// Create a client without a token.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                base_url,
                token: RwLock::new(None),
            }),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in and keep the returned token for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::AuthenticationFailed` if the credentials are
    /// rejected or the response holds no token.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<AccessToken, AdminApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let token = auth::login(&self.inner.client, url, username, password).await?;

        *self.inner.token.write().await = Some(token.access_token.clone());
        tracing::info!("Admin logged in");
        Ok(token)
    }

    /// Set the token directly (for loading a saved session).
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Whether a token is held.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Forget the token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is held or the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, AdminApiError> {
        let request = self.authorized(reqwest::Method::GET, &["products"]).await?;
        Ok(send_json(&self.inner.client, request).await?)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is held or the backend rejects the product.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, AdminApiError> {
        let request = self
            .authorized(reqwest::Method::POST, &["products"])
            .await?
            .json(input);
        let product: Product = send_json(&self.inner.client, request).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is held or the backend rejects the update.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, input: &ProductInput) -> Result<Product, AdminApiError> {
        let request = self
            .authorized(reqwest::Method::PUT, &["products", id.as_str()])
            .await?
            .json(input);
        let product = send_json(&self.inner.client, request).await?;
        tracing::info!("Product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is held or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminApiError> {
        let request = self
            .authorized(reqwest::Method::DELETE, &["products", id.as_str()])
            .await?;
        send(&self.inner.client, request).await?;
        tracing::info!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// List every order.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is held or the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, AdminApiError> {
        let request = self.authorized(reqwest::Method::GET, &["orders"]).await?;
        Ok(send_json(&self.inner.client, request).await?)
    }

    /// Set an order's status.
    ///
    /// The status travels as a `status` query parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is held or the backend rejects the change.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), AdminApiError> {
        let token = self.token().await?;
        let mut url = self.endpoint(&["orders", id.as_str(), "status"])?;
        url.query_pairs_mut().append_pair("status", status.as_str());

        let request = self
            .inner
            .client
            .put(url)
            .bearer_auth(token.expose_secret());
        send(&self.inner.client, request).await?;
        tracing::info!("Order status updated");
        Ok(())
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// Upload images, returning their URLs in upload order.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::UploadFailed` if the backend reports that not
    /// every image was stored, or another error if the request fails.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_images(&self, files: Vec<ImageFile>) -> Result<Vec<String>, AdminApiError> {
        let sent = files.len();
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(file.mime)
                .map_err(ApiError::from)?;
            form = form.part("files", part);
        }

        let request = self
            .authorized(reqwest::Method::POST, &["upload", "images"])
            .await?
            .multipart(form);
        let response: UploadResponse = send_json(&self.inner.client, request).await?;

        let urls = response.into_urls(sent)?;
        tracing::info!(count = urls.len(), "Images uploaded");
        Ok(urls)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn token(&self) -> Result<SecretString, AdminApiError> {
        self.inner
            .token
            .read()
            .await
            .clone()
            .ok_or(AdminApiError::NoAccessToken)
    }

    async fn authorized(
        &self,
        method: reqwest::Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, AdminApiError> {
        let token = self.token().await?;
        let url = self.endpoint(segments)?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .bearer_auth(token.expose_secret()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> AdminClient {
        // Port 9 (discard) is never listened on in test environments.
        AdminClient::new(Url::parse("http://127.0.0.1:9/api/").unwrap())
    }

    #[tokio::test]
    async fn test_calls_without_token_fail_before_io() {
        let client = client();
        assert!(!client.has_token().await);
        assert!(matches!(client.list_products().await, Err(AdminApiError::NoAccessToken)));
        assert!(matches!(client.list_orders().await, Err(AdminApiError::NoAccessToken)));
        assert!(matches!(
            client
                .update_order_status(&OrderId::new("o1"), OrderStatus::Shipped)
                .await,
            Err(AdminApiError::NoAccessToken)
        ));
        assert!(matches!(
            client.delete_product(&ProductId::new("p1")).await,
            Err(AdminApiError::NoAccessToken)
        ));
        assert!(matches!(
            client.upload_images(Vec::new()).await,
            Err(AdminApiError::NoAccessToken)
        ));
    }

    fn upload_response(value: serde_json::Value) -> UploadResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_upload_response_needs_every_file() {
        let two = serde_json::json!([{"url": "https://cdn/a.jpg"}, {"url": "https://cdn/b.jpg"}]);

        let urls = upload_response(serde_json::json!({"success": true, "uploaded": two}))
            .into_urls(2)
            .unwrap();
        assert_eq!(urls, ["https://cdn/a.jpg", "https://cdn/b.jpg"]);

        let short = upload_response(serde_json::json!({"success": true, "uploaded": two})).into_urls(3);
        assert!(matches!(short, Err(AdminApiError::UploadFailed(ref msg)) if msg == UPLOAD_FAILED));

        let failed = upload_response(serde_json::json!({"success": false, "uploaded": two})).into_urls(2);
        assert!(matches!(failed, Err(AdminApiError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn test_token_slot_shared_between_clones() {
        let client = client();
        let clone = client.clone();
        client.set_token(SecretString::from("t0k3n")).await;
        assert!(clone.has_token().await);
        clone.clear_token().await;
        assert!(!client.has_token().await);
    }

    #[test]
    fn test_endpoint_under_base_path() {
        let url = client().endpoint(&["orders", "abc", "status"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/api/orders/abc/status");
    }

    #[test]
    fn test_error_classification() {
        assert!(!AdminApiError::NoAccessToken.is_server_fault());
        assert!(AdminApiError::UploadFailed(UPLOAD_FAILED.into()).is_server_fault());
        assert!(
            AdminApiError::Api(ApiError::Status {
                status: 500,
                message: String::new()
            })
            .is_server_fault()
        );
    }
}
