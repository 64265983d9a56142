//! Checkout: validate the delivery form, build the order, submit it.

use rakhshan_core::{CartLineItem, NewOrder, OrderItem};
use thiserror::Error;
use tracing::instrument;

use crate::api::OrderConfirmation;
use crate::error::{Result, add_breadcrumb};
use crate::state::StorefrontContext;

/// Checkout rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Please enter your {0}")]
    MissingField(&'static str),
    #[error("Your cart is empty")]
    EmptyCart,
}

/// Delivery details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
}

impl CheckoutForm {
    #[must_use]
    pub fn new(
        customer_name: impl Into<String>,
        phone_number: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            phone_number: phone_number.into(),
            address: address.into(),
        }
    }

    /// Build the order for `lines`, one item per line in cart order.
    ///
    /// Fields are trimmed; prices are left to the backend.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if a field is blank or the cart is empty.
    pub fn build_order(&self, lines: &[CartLineItem]) -> Result<NewOrder, CheckoutError> {
        let customer_name = required(&self.customer_name, "name")?;
        let phone_number = required(&self.phone_number, "phone number")?;
        let address = required(&self.address, "address")?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(NewOrder {
            items: lines.iter().map(OrderItem::from).collect(),
            customer_name,
            phone_number,
            address,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, CheckoutError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CheckoutError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// Submit the cart as an order and clear the cart once the backend accepts it.
///
/// On any failure the cart is left exactly as it was.
///
/// # Errors
///
/// Returns `AppError::Checkout` for an invalid form or empty cart (no request
/// is made), or `AppError::Api` if the backend rejects the order.
#[instrument(skip(ctx, form), fields(lines = ctx.cart().len()))]
pub async fn place_order(ctx: &mut StorefrontContext, form: &CheckoutForm) -> Result<OrderConfirmation> {
    let order = form.build_order(ctx.cart().lines())?;
    let confirmation = ctx.api().submit_order(&order).await?;

    ctx.cart_mut().clear();
    add_breadcrumb("checkout", "Order placed", None);
    tracing::info!(
        order_id = ?confirmation.id,
        items = order.items.len(),
        "Checkout complete"
    );
    Ok(confirmation)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rakhshan_core::{Product, Quantity};

    use super::*;

    fn line(id: &str, qty: u32, size: Option<&str>) -> CartLineItem {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": id, "name": "Cap", "price": 850, "category": "Traditional",
        }))
        .unwrap();
        CartLineItem {
            product,
            quantity: Quantity::new(qty).unwrap(),
            size: size.map(String::from),
            color: None,
        }
    }

    #[test]
    fn test_build_order_maps_lines() {
        let form = CheckoutForm::new("  Aisha Khan ", "03001234567", "12 Mall Road, Lahore");
        let order = form
            .build_order(&[line("A", 3, Some("M")), line("B", 1, None)])
            .unwrap();

        assert_eq!(order.customer_name, "Aisha Khan");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_id.as_str(), "A");
        assert_eq!(order.items[0].qty.get(), 3);

        let body = serde_json::to_value(&order).unwrap();
        assert_eq!(body["items"][0]["size"], "M");
        assert_eq!(body["items"][1]["size"], "N/A");
        assert_eq!(body["items"][1]["color"], "N/A");
        assert!(body["items"][0].get("price").is_none());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let lines = [line("A", 1, None)];
        assert_eq!(
            CheckoutForm::new(" ", "0300", "Lahore").build_order(&lines),
            Err(CheckoutError::MissingField("name"))
        );
        assert_eq!(
            CheckoutForm::new("Ali", "", "Lahore").build_order(&lines),
            Err(CheckoutError::MissingField("phone number"))
        );
        assert_eq!(
            CheckoutForm::new("Ali", "0300", "\t").build_order(&lines),
            Err(CheckoutError::MissingField("address"))
        );
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert_eq!(
            CheckoutForm::new("Ali", "0300", "Lahore").build_order(&[]),
            Err(CheckoutError::EmptyCart)
        );
        assert_eq!(CheckoutError::MissingField("address").to_string(), "Please enter your address");
    }
}
