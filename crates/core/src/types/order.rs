//! Orders submitted at checkout and managed from the admin console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartLineItem;
use super::id::{OrderId, ProductId};
use super::quantity::Quantity;
use super::selection;
use super::status::OrderStatus;

/// One ordered product. Carries no price: the backend prices orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub qty: Quantity,
    #[serde(with = "selection")]
    pub size: Option<String>,
    #[serde(with = "selection")]
    pub color: Option<String>,
}

impl From<&CartLineItem> for OrderItem {
    fn from(line: &CartLineItem) -> Self {
        Self {
            product_id: line.product.id.clone(),
            qty: line.quantity,
            size: line.size.clone(),
            color: line.color.clone(),
        }
    }
}

impl OrderItem {
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

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
}

/// An order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total number of units across all items.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.qty.get())).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_defaults_to_pending() {
        let json = r#"{
            "_id": "65f0a1b2c3d4",
            "items": [{"product_id": "A", "qty": 2, "size": "M", "color": "N/A"}],
            "customer_name": "Ayesha",
            "phone_number": "0300-1234567",
            "address": "12 Mall Road, Lahore"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items[0].color, None);
        assert_eq!(order.items[0].size.as_deref(), Some("M"));
        assert_eq!(order.unit_count(), 2);
        assert_eq!(order.email, None);
    }

    #[test]
    fn test_new_order_has_no_price() {
        let order = NewOrder {
            items: vec![OrderItem {
                product_id: ProductId::new("A"),
                qty: Quantity::ONE,
                size: None,
                color: Some("Black".into()),
            }],
            customer_name: "Bilal".into(),
            phone_number: "123".into(),
            address: "Street 1".into(),
        };
        let value = serde_json::to_value(&order).unwrap();
        let item = &value["items"][0];
        assert!(item.get("price").is_none());
        assert_eq!(item["size"], "N/A");
        assert_eq!(item["qty"], 1);
    }

    #[test]
    fn test_created_at_parses_rfc3339() {
        let json = r#"{"id": "1", "items": [], "customer_name": "a", "phone_number": "b",
            "address": "c", "status": "shipped", "created_at": "2025-03-01T10:00:00Z"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert!(order.created_at.is_some());
    }
}
