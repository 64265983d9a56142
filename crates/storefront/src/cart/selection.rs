//! Turning a shopper's choices into a cart line.

use rakhshan_core::{CartLineItem, Product, Quantity, selection};
use thiserror::Error;

/// Reasons a product cannot be added with the given choices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("{0} is out of stock")]
    OutOfStock(String),
    #[error("Please select a size")]
    SizeRequired,
    #[error("Please select a color")]
    ColorRequired,
    #[error("Size '{0}' is not available for this product")]
    UnknownSize(String),
    #[error("Color '{0}' is not available for this product")]
    UnknownColor(String),
}

/// Size, color and quantity picked on a product page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSelection {
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: Quantity,
}

impl LineSelection {
    /// A selection of one unit with the given size and color.
    #[must_use]
    pub fn new(size: Option<String>, color: Option<String>) -> Self {
        Self {
            size,
            color,
            quantity: Quantity::ONE,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    /// Validate the choices against `product` and build the cart line.
    ///
    /// The product is snapshotted into the line.
    ///
    /// # Errors
    ///
    /// Returns a `SelectionError` when the product is out of stock, a
    /// required choice is missing, or a choice is not offered.
    pub fn into_line(self, product: &Product) -> Result<CartLineItem, SelectionError> {
        if !product.in_stock {
            return Err(SelectionError::OutOfStock(product.name.clone()));
        }

        let size = selection::normalize(self.size);
        let color = selection::normalize(self.color);

        match &size {
            None if product.requires_size() => return Err(SelectionError::SizeRequired),
            Some(s) if !product.offers_size(s) => return Err(SelectionError::UnknownSize(s.clone())),
            _ => {}
        }
        match &color {
            None if product.requires_color() => return Err(SelectionError::ColorRequired),
            Some(c) if !product.offers_color(c) => {
                return Err(SelectionError::UnknownColor(c.clone()));
            }
            _ => {}
        }

        Ok(CartLineItem {
            product: product.clone(),
            quantity: self.quantity,
            size,
            color,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(sizes: &[&str], colors: &[&str], in_stock: bool) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": "P1",
            "name": "Embroidered Black Cap",
            "price": 1200,
            "category": "Premium",
            "sizes": sizes,
            "colors": colors,
            "in_stock": in_stock,
        }))
        .unwrap()
    }

    #[test]
    fn test_requires_size_and_color() {
        let p = product(&["M", "L"], &["Black"], true);
        assert_eq!(
            LineSelection::new(None, Some("Black".into())).into_line(&p),
            Err(SelectionError::SizeRequired)
        );
        assert_eq!(
            LineSelection::new(Some("M".into()), None).into_line(&p),
            Err(SelectionError::ColorRequired)
        );
        let line = LineSelection::new(Some("M".into()), Some("Black".into()))
            .with_quantity(Quantity::new(2).unwrap())
            .into_line(&p)
            .unwrap();
        assert_eq!(line.size.as_deref(), Some("M"));
        assert_eq!(line.quantity.get(), 2);
        assert_eq!(line.product, p);
    }

    #[test]
    fn test_no_choices_needed() {
        let p = product(&[], &[], true);
        let line = LineSelection::default().into_line(&p).unwrap();
        assert_eq!(line.size, None);
        assert_eq!(line.color, None);
        assert_eq!(line.quantity, Quantity::ONE);
        assert_eq!(line.size_label(), "N/A");
    }

    #[test]
    fn test_sentinel_and_blank_count_as_no_choice() {
        let p = product(&[], &[], true);
        let line = LineSelection::new(Some("N/A".into()), Some("  ".into()))
            .into_line(&p)
            .unwrap();
        assert_eq!(line.size, None);
        assert_eq!(line.color, None);
    }

    #[test]
    fn test_unknown_choices_rejected() {
        let p = product(&["M"], &[], true);
        assert_eq!(
            LineSelection::new(Some("XXL".into()), None).into_line(&p),
            Err(SelectionError::UnknownSize("XXL".into()))
        );
        assert_eq!(
            LineSelection::new(Some("M".into()), Some("Gold".into())).into_line(&p),
            Err(SelectionError::UnknownColor("Gold".into()))
        );
    }

    #[test]
    fn test_out_of_stock_rejected() {
        let p = product(&[], &[], false);
        assert_eq!(
            LineSelection::default().into_line(&p),
            Err(SelectionError::OutOfStock("Embroidered Black Cap".into()))
        );
    }
}
