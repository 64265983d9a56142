//! Order views for the admin console.
//!
//! Orders carry no prices, so the total shown next to an order is an
//! estimate from the live catalog. It can drift from what the customer saw
//! if prices changed since, and it is unavailable when an ordered product
//! has been deleted.

use std::collections::HashMap;
use std::fmt;

use rakhshan_core::price::format_amount;
use rakhshan_core::{Order, OrderItem, Price, Product, ProductId};
use rust_decimal::Decimal;

/// Catalog estimate of an order's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTotal {
    Estimated(Decimal),
    /// At least one ordered product is no longer in the catalog.
    Unavailable,
}

impl fmt::Display for OrderTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Estimated(amount) => f.write_str(&format_amount(*amount)),
            Self::Unavailable => f.write_str("-"),
        }
    }
}

/// Product prices keyed by id, built once per listing.
#[derive(Debug, Default)]
pub struct PriceIndex {
    prices: HashMap<ProductId, Price>,
}

impl PriceIndex {
    #[must_use]
    pub fn new(catalog: &[Product]) -> Self {
        Self {
            prices: catalog
                .iter()
                .map(|p| (p.id.clone(), p.price))
                .collect(),
        }
    }

    /// Estimate the value of `order` at current catalog prices, saturating
    /// at [`Decimal::MAX`].
    #[must_use]
    pub fn order_total(&self, order: &Order) -> OrderTotal {
        let mut total = Decimal::ZERO;
        for item in &order.items {
            let Some(price) = self.prices.get(&item.product_id) else {
                return OrderTotal::Unavailable;
            };
            total = total.saturating_add(price.times(item.qty));
        }
        OrderTotal::Estimated(total)
    }
}

/// One-line summary of an ordered item: `2x <product id> (M, Black)`.
#[must_use]
pub fn item_summary(item: &OrderItem) -> String {
    format!(
        "{}x {} ({}, {})",
        item.qty,
        item.product_id,
        item.size_label(),
        item.color_label()
    )
}

/// Customer email for display.
#[must_use]
pub fn email_label(order: &Order) -> &str {
    order.email.as_deref().unwrap_or(rakhshan_core::NOT_APPLICABLE)
}
