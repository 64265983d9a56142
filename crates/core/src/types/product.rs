//! Catalog products.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

const fn in_stock_default() -> bool {
    true
}

/// A catalog product as served by `GET /products`.
///
/// Carts embed a snapshot of this record taken when the item was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Backend document id.
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: String,
    /// Image URLs, primary image first.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Offered sizes. Empty means no size choice is needed.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Offered colors. Empty means no color choice is needed.
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,
}

impl Product {
    /// Whether a size must be chosen before adding to cart.
    #[must_use]
    pub fn requires_size(&self) -> bool {
        !self.sizes.is_empty()
    }

    /// Whether a color must be chosen before adding to cart.
    #[must_use]
    pub fn requires_color(&self) -> bool {
        !self.colors.is_empty()
    }

    /// Whether `size` is one of the offered sizes.
    #[must_use]
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// Whether `color` is one of the offered colors.
    #[must_use]
    pub fn offers_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }

    /// First image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// The editable fields of this product.
    #[must_use]
    pub fn to_input(&self) -> ProductInput {
        ProductInput {
            name: self.name.clone(),
            price: self.price,
            category: self.category.clone(),
            description: self.description.clone(),
            images: self.images.clone(),
            sizes: self.sizes.clone(),
            colors: self.colors.clone(),
            in_stock: self.in_stock,
        }
    }
}

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    pub category: String,
    pub description: String,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub in_stock: bool,
}
