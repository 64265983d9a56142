//! Storefront context passed to every consumer.

use rakhshan_core::ProductId;
use tracing::instrument;

use crate::api::ApiClient;
use crate::cart::{CartManager, CartStore, FileCartStore, LineSelection};
use crate::catalog::CatalogQuery;
use crate::config::StorefrontConfig;
use crate::error::Result;
use rakhshan_core::Product;

/// Configuration, API client and cart for one storefront session.
///
/// Created once at start; the cart is hydrated from its store here.
#[derive(Debug)]
pub struct StorefrontContext {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartManager,
}

impl StorefrontContext {
    /// Create a context whose cart lives in the configured file.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let store = FileCartStore::new(config.cart_path.clone());
        Self::with_store(config, store)
    }

    /// Create a context with a custom cart store.
    #[must_use]
    pub fn with_store(config: StorefrontConfig, store: impl CartStore + 'static) -> Self {
        let api = ApiClient::new(&config.api);
        let cart = CartManager::hydrate(store);
        Self { config, api, cart }
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartManager {
        &mut self.cart
    }

    /// Fetch the catalog and apply `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched.
    pub async fn browse(&self, query: &CatalogQuery) -> Result<Vec<Product>> {
        let products = self.api.list_products().await?;
        Ok(query.apply(&products))
    }

    /// Look up a product and add it to the cart with the given choices.
    ///
    /// The product is fetched first so the cart snapshots current data.
    /// Returns the index of the affected line.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be fetched or the selection is
    /// invalid; the cart is untouched in both cases.
    #[instrument(skip(self, selection), fields(product_id = %product_id))]
    pub async fn add_to_cart(&mut self, product_id: &ProductId, selection: LineSelection) -> Result<usize> {
        let product = self.api.get_product(product_id).await?;
        let line = selection.into_line(&product)?;
        Ok(self.cart.add(line))
    }
}
