//! Cart commands. Line numbers are 1-based.

use rakhshan_core::price::format_amount;
use rakhshan_core::{ProductId, Quantity};
use rakhshan_storefront::cart::{LineSelection, QuantityUpdate};
use rakhshan_storefront::{AppError, StorefrontContext};

use super::{CliError, line_index};

pub fn show(ctx: &StorefrontContext) {
    let cart = ctx.cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for (i, line) in cart.lines().iter().enumerate() {
        println!(
            "{:>3}. {:<32} size {:<6} color {:<10} {:>4} x {:>10} = {:>10}",
            i + 1,
            line.product.name,
            line.size_label(),
            line.color_label(),
            line.quantity.get(),
            line.product.price.to_string(),
            format_amount(line.line_total()),
        );
    }
    println!("Items: {}", cart.item_count());
    println!("Total: {}", format_amount(cart.total()));
    warn_if_unsaved(ctx);
}

pub async fn add(
    ctx: &mut StorefrontContext,
    product_id: &str,
    size: Option<String>,
    color: Option<String>,
    qty: &str,
) -> Result<(), CliError> {
    let quantity: Quantity = qty.parse().map_err(AppError::from)?;
    let selection = LineSelection::new(size, color).with_quantity(quantity);

    let index = ctx.add_to_cart(&ProductId::new(product_id), selection).await?;
    if let Some(line) = ctx.cart().lines().get(index) {
        println!(
            "Added {} to cart (line {}, quantity {}).",
            line.product.name,
            index + 1,
            line.quantity
        );
    }
    warn_if_unsaved(ctx);
    Ok(())
}

pub fn remove(ctx: &mut StorefrontContext, line: usize) -> Result<(), CliError> {
    let index = line_index(line)?;
    match ctx.cart_mut().remove(index) {
        Some(removed) => println!("Removed {} from cart.", removed.product.name),
        None => return Err(no_such_line(line)),
    }
    warn_if_unsaved(ctx);
    Ok(())
}

pub fn update(ctx: &mut StorefrontContext, line: usize, delta: i64) -> Result<(), CliError> {
    let index = line_index(line)?;
    match ctx.cart_mut().update_quantity(index, delta) {
        QuantityUpdate::Updated(quantity) => println!("Line {line} quantity is now {quantity}."),
        QuantityUpdate::Floored(quantity) => println!(
            "Quantity cannot go below 1; line {line} stays at {quantity}. Use `rk cart remove {line}` to remove it."
        ),
        QuantityUpdate::OutOfRange => return Err(no_such_line(line)),
    }
    warn_if_unsaved(ctx);
    Ok(())
}

pub fn clear(ctx: &mut StorefrontContext) {
    ctx.cart_mut().clear();
    println!("Cart cleared.");
    warn_if_unsaved(ctx);
}

fn no_such_line(line: usize) -> CliError {
    CliError::Usage(format!("There is no line {line} in your cart"))
}

fn warn_if_unsaved(ctx: &StorefrontContext) {
    if !ctx.cart().persistence_healthy() {
        eprintln!(
            "Warning: the cart could not be saved to {}; changes will be lost when this command exits.",
            ctx.config().cart_path.display()
        );
    }
}
