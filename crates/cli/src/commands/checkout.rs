//! Checkout command.

use rakhshan_core::price::format_amount;
use rakhshan_storefront::StorefrontContext;
use rakhshan_storefront::checkout::{CheckoutForm, place_order};

use super::CliError;

pub async fn run(ctx: &mut StorefrontContext, name: String, phone: String, address: String) -> Result<(), CliError> {
    let form = CheckoutForm::new(name, phone, address);
    let total = ctx.cart().total();
    let confirmation = place_order(ctx, &form).await?;

    println!("Order placed successfully!");
    if let Some(id) = &confirmation.id {
        println!("Order #{} ({id})", id.short());
    }
    println!("Total: {}", format_amount(total));
    Ok(())
}
