//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;
use super::quantity::Quantity;
use super::selection;

/// One row of the shopping cart.
///
/// The embedded product is a snapshot owned by the line; later catalog
/// changes do not reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product: Product,
    #[serde(rename = "qty")]
    pub quantity: Quantity,
    /// Chosen size, `None` when the product has no sizes.
    #[serde(with = "selection")]
    pub size: Option<String>,
    /// Chosen color, `None` when the product has no colors.
    #[serde(with = "selection")]
    pub color: Option<String>,
}

/// Identity of a cart line: same product, size and color means same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub product_id: &'a ProductId,
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
}

impl CartLineItem {
    /// Identity key used for merging.
    #[must_use]
    pub fn key(&self) -> LineKey<'_> {
        LineKey {
            product_id: &self.product.id,
            size: self.size.as_deref(),
            color: self.color.as_deref(),
        }
    }

    /// Canonical form of the selections: trimmed, with blanks and `N/A`
    /// folded into `None`. Matches what a save and load would produce.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.size = selection::normalize(self.size);
        self.color = selection::normalize(self.color);
        self
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.times(self.quantity)
    }

    /// Size for display (`N/A` when none applies).
    #[must_use]
    pub fn size_label(&self) -> &str {
        selection::display(self.size.as_deref())
    }

    /// Color for display (`N/A` when none applies).
    #[must_use]
    pub fn color_label(&self) -> &str {
        selection::display(self.color.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(size: Option<&str>, color: Option<&str>) -> CartLineItem {
        let product: Product = serde_json::from_str(
            r#"{"_id": "A", "name": "Kufi", "price": 850, "category": "Traditional"}"#,
        )
        .unwrap();
        CartLineItem {
            product,
            quantity: Quantity::new(2).unwrap(),
            size: size.map(String::from),
            color: color.map(String::from),
        }
    }

    #[test]
    fn test_key_distinguishes_selection() {
        assert_eq!(line(Some("M"), None).key(), line(Some("M"), None).key());
        assert_ne!(line(Some("M"), None).key(), line(Some("L"), None).key());
        assert_ne!(line(Some("M"), None).key(), line(Some("M"), Some("Red")).key());
    }

    #[test]
    fn test_persisted_shape_uses_qty_and_sentinel() {
        let value = serde_json::to_value(line(Some("M"), None)).unwrap();
        assert_eq!(value["qty"], 2);
        assert_eq!(value["size"], "M");
        assert_eq!(value["color"], "N/A");
        assert_eq!(value["product"]["_id"], "A");
    }

    #[test]
    fn test_normalized_matches_persisted_form() {
        let raw = line(Some(" M "), Some("N/A"));
        let normalized = raw.clone().normalized();
        assert_eq!(normalized.size.as_deref(), Some("M"));
        assert_eq!(normalized.color, None);

        let reloaded: CartLineItem = serde_json::from_value(serde_json::to_value(&raw).unwrap()).unwrap();
        assert_eq!(reloaded, normalized);
        assert_eq!(line(Some(""), None).normalized().key(), line(None, None).key());
    }

    #[test]
    fn test_line_total_and_labels() {
        let item = line(None, Some("White"));
        assert_eq!(item.line_total(), Decimal::from(1700));
        assert_eq!(item.size_label(), "N/A");
        assert_eq!(item.color_label(), "White");
    }
}
