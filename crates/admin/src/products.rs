//! Product form: raw admin input to a [`ProductInput`].
//!
//! List fields (images, sizes, colors) are entered as comma-separated text.

use rakhshan_core::{Price, PriceError, Product, ProductInput};
use thiserror::Error;

/// Product form rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductFormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),
}

/// Raw product form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub category: String,
    pub description: String,
    /// Comma-separated image URLs.
    pub images: String,
    /// Comma-separated sizes.
    pub sizes: String,
    /// Comma-separated colors.
    pub colors: String,
    pub in_stock: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            price: String::new(),
            category: String::new(),
            description: String::new(),
            images: String::new(),
            sizes: String::new(),
            colors: String::new(),
            in_stock: true,
        }
    }
}

impl ProductForm {
    /// Prefill the form from an existing product for editing.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            description: product.description.clone(),
            images: product.images.join(", "),
            sizes: product.sizes.join(", "),
            colors: product.colors.join(", "),
            in_stock: product.in_stock,
        }
    }

    /// Validate and convert the form.
    ///
    /// # Errors
    ///
    /// Returns `ProductFormError` if the name, category or price is missing,
    /// or the price is not a non-negative number.
    pub fn to_input(&self) -> Result<ProductInput, ProductFormError> {
        let name = required(&self.name, "Name")?;
        let category = required(&self.category, "Category")?;
        let price: Price = required(&self.price, "Price")?.parse()?;

        Ok(ProductInput {
            name,
            price,
            category,
            description: self.description.trim().to_string(),
            images: split_list(&self.images),
            sizes: split_list(&self.sizes),
            colors: split_list(&self.colors),
            in_stock: self.in_stock,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ProductFormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ProductFormError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// Split comma-separated text, trimming entries and dropping empty ones.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
