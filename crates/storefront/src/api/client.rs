//! Storefront REST client implementation.
//!
//! Caches products using `moka` for the configured TTL.

use std::sync::Arc;

use moka::future::Cache;
use rakhshan_core::{NewOrder, OrderId, Product, ProductId};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, send, send_json};
use crate::config::ApiConfig;

/// Maximum number of cached catalog entries.
const CACHE_CAPACITY: u64 = 1000;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront endpoints of the REST backend.
///
/// Cheaply cloneable; clones share the connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cached", &self.inner.cache.is_some())
            .finish_non_exhaustive()
    }
}

/// What the backend returns after accepting an order.
///
/// Backends differ in how much of the order they echo back, so every field
/// is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderConfirmation {
    /// Id of the created order, when reported.
    #[serde(default, rename = "_id", alias = "id", alias = "order_id")]
    pub id: Option<OrderId>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let cache = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint from path segments (each segment is escaped).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Products(products)) = cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product list");
            return Ok(products.as_ref().clone());
        }

        let url = self.endpoint(&["products"])?;
        let products: Vec<Product> =
            send_json(&self.inner.client, self.inner.client.get(url)).await?;
        debug!(count = products.len(), "Fetched product list");

        if let Some(cache) = &self.inner.cache {
            for product in &products {
                cache
                    .insert(
                        CacheKey::Product(product.id.clone()),
                        CacheValue::Product(Box::new(product.clone())),
                    )
                    .await;
            }
            cache
                .insert(CacheKey::Products, CacheValue::Products(Arc::new(products.clone())))
                .await;
        }

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the backend has no such product, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Product(product)) = cache.get(&key).await
        {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", id.as_str()])?;
        let product: Product = match send_json(&self.inner.client, self.inner.client.get(url)).await {
            Ok(product) => product,
            Err(ApiError::Status { status: 404, .. }) => {
                return Err(ApiError::NotFound(format!("product {id}")));
            }
            Err(e) => return Err(e),
        };

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// Drop every cached catalog entry.
    pub fn invalidate_catalog(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order built at checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the backend rejects the
    /// order.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn submit_order(&self, order: &NewOrder) -> Result<OrderConfirmation, ApiError> {
        let url = self.endpoint(&["orders"])?;
        let body = send(&self.inner.client, self.inner.client.post(url).json(order)).await?;

        let confirmation = if body.trim().is_empty() {
            OrderConfirmation::default()
        } else {
            serde_json::from_str(&body).unwrap_or_else(|e| {
                debug!(error = %e, "Order response was not an object, ignoring body");
                OrderConfirmation::default()
            })
        };

        tracing::info!(order_id = ?confirmation.id, "Order submitted");
        Ok(confirmation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(ttl: Duration) -> ApiClient {
        let mut config = ApiConfig::new("http://localhost:8000/api").unwrap();
        config.catalog_cache_ttl = ttl;
        ApiClient::new(&config)
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let client = client(Duration::ZERO);
        let url = client.endpoint(&["products", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/products/a%2Fb%20c");
    }

    #[test]
    fn test_cache_disabled_with_zero_ttl() {
        assert!(client(Duration::ZERO).inner.cache.is_none());
        assert!(client(Duration::from_secs(60)).inner.cache.is_some());
    }

    #[test]
    fn test_order_confirmation_aliases() {
        let c: OrderConfirmation = serde_json::from_str(r#"{"_id": "abc", "status": "pending"}"#).unwrap();
        assert_eq!(c.id.unwrap().as_str(), "abc");
        let c: OrderConfirmation = serde_json::from_str(r#"{"order_id": "xyz"}"#).unwrap();
        assert_eq!(c.id.unwrap().as_str(), "xyz");
        let c: OrderConfirmation = serde_json::from_str(r#"{"message": "ok"}"#).unwrap();
        assert_eq!(c.id, None);
    }
}
