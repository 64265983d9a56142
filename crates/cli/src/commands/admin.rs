//! Admin console commands.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from RAKHSHAN_ADMIN_PASSWORD, or piped in)
//! echo "$PASSWORD" | rk admin login -u admin --password-stdin
//!
//! # Products
//! rk admin products create --name "Classic White Kufi" --price 850 --category Traditional --sizes "S, M, L"
//! rk admin products update 65f0a1 --in-stock false
//!
//! # Orders
//! rk admin orders list --status pending
//! rk admin orders status 65f0a1b2c3d4 shipped
//! ```

use std::io::BufRead;
use std::path::PathBuf;

use rakhshan_admin::dashboard;
use rakhshan_admin::orders::{email_label, item_summary};
use rakhshan_admin::products::ProductForm;
use rakhshan_admin::{AdminContext, AdminError};
use rakhshan_core::{OrderId, OrderStatus, Product, ProductId};
use secrecy::SecretString;

use super::CliError;
use super::shop::product_row;

/// Product fields given on the command line; `None` means "not given".
#[derive(Debug, Default)]
pub struct ProductEdit {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub images: Option<String>,
    pub sizes: Option<String>,
    pub colors: Option<String>,
    pub in_stock: Option<bool>,
}

impl ProductEdit {
    /// Overwrite the given fields of `form`.
    fn apply(self, form: &mut ProductForm) {
        let fields = [
            (self.name, &mut form.name),
            (self.price, &mut form.price),
            (self.category, &mut form.category),
            (self.description, &mut form.description),
            (self.images, &mut form.images),
            (self.sizes, &mut form.sizes),
            (self.colors, &mut form.colors),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(in_stock) = self.in_stock {
            form.in_stock = in_stock;
        }
    }
}

// =============================================================================
// Session
// =============================================================================

pub async fn login(ctx: &mut AdminContext, username: &str, password_stdin: bool) -> Result<(), CliError> {
    let password = if password_stdin {
        read_password_line()?
    } else {
        ctx.config().admin_password.clone().ok_or_else(|| {
            CliError::Usage("Set RAKHSHAN_ADMIN_PASSWORD or pass --password-stdin".to_string())
        })?
    };

    let session = ctx.login(username, &password).await?;
    println!("Logged in as {}.", session.username);
    Ok(())
}

fn read_password_line() -> Result<SecretString, CliError> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CliError::Usage(format!("Could not read password from stdin: {e}")))?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CliError::Usage("Empty password on stdin".to_string()));
    }
    Ok(SecretString::from(password))
}

pub async fn logout(ctx: &mut AdminContext) -> Result<(), CliError> {
    ctx.logout().await?;
    println!("Logged out.");
    Ok(())
}

pub async fn dashboard(ctx: &AdminContext) -> Result<(), CliError> {
    let dashboard = dashboard::load(ctx.client()).await.map_err(AdminError::from)?;
    let stats = dashboard.stats;
    if let Some(username) = ctx.username() {
        println!("Signed in as {username}");
    }
    println!("Total products: {} ({} out of stock)", stats.products, stats.out_of_stock);
    println!("Total orders:   {} ({} open)", stats.orders, stats.open_orders);
    for (status, count) in &dashboard.by_status {
        println!("  {:<10} {count}", status.as_str());
    }
    Ok(())
}

// =============================================================================
// Products
// =============================================================================

pub async fn list_products(ctx: &AdminContext) -> Result<(), CliError> {
    let products = ctx.client().list_products().await.map_err(AdminError::from)?;
    for product in &products {
        println!("{}", product_row(product));
    }
    println!("{} product(s)", products.len());
    Ok(())
}

pub async fn create_product(ctx: &AdminContext, edit: ProductEdit) -> Result<(), CliError> {
    let mut form = ProductForm::default();
    edit.apply(&mut form);
    let input = form.to_input().map_err(AdminError::from)?;

    let product = ctx.client().create_product(&input).await.map_err(AdminError::from)?;
    println!("Product created: {} ({})", product.name, product.id);
    Ok(())
}

pub async fn update_product(ctx: &AdminContext, id: &str, edit: ProductEdit) -> Result<(), CliError> {
    let existing = find_product(ctx, &ProductId::new(id)).await?;
    let mut form = ProductForm::from_product(&existing);
    edit.apply(&mut form);
    let input = form.to_input().map_err(AdminError::from)?;

    let product = ctx
        .client()
        .update_product(&existing.id, &input)
        .await
        .map_err(AdminError::from)?;
    println!("Product updated: {} ({})", product.name, product.id);
    Ok(())
}

pub async fn delete_product(ctx: &AdminContext, id: &str) -> Result<(), CliError> {
    ctx.client()
        .delete_product(&ProductId::new(id))
        .await
        .map_err(AdminError::from)?;
    println!("Product deleted.");
    Ok(())
}

async fn find_product(ctx: &AdminContext, id: &ProductId) -> Result<Product, CliError> {
    ctx.client()
        .list_products()
        .await
        .map_err(AdminError::from)?
        .into_iter()
        .find(|p| p.id == *id)
        .ok_or_else(|| AdminError::NotFound(format!("product {id}")).into())
}

// =============================================================================
// Orders
// =============================================================================

pub async fn list_orders(ctx: &AdminContext, status: Option<&str>) -> Result<(), CliError> {
    let status = status.map(parse_status).transpose()?;
    let orders = ctx.orders_with_totals().await?;

    let mut shown = 0usize;
    for (order, total) in orders.iter().filter(|(o, _)| status.is_none_or(|s| o.status == s)) {
        let items: Vec<String> = order.items.iter().map(item_summary).collect();
        println!(
            "#{:<6} {:<20} {:<14} {:<10} {:>10}  {}",
            order.id.short(),
            order.customer_name,
            order.phone_number,
            order.status.as_str(),
            total.to_string(),
            items.join("; ")
        );
        shown += 1;
    }
    println!("{shown} order(s)");
    Ok(())
}

pub async fn show_order(ctx: &AdminContext, id: &str) -> Result<(), CliError> {
    let (order, total) = ctx.find_order(&OrderId::new(id)).await?;

    println!("Order #{} ({})", order.id.short(), order.id);
    println!("  Status:   {}", order.status);
    if let Some(created_at) = order.created_at {
        println!("  Placed:   {}", created_at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  Customer: {}", order.customer_name);
    println!("  Email:    {}", email_label(&order));
    println!("  Phone:    {}", order.phone_number);
    println!("  Address:  {}", order.address);
    println!("  Items:");
    for item in &order.items {
        println!("    {}", item_summary(item));
    }
    println!("  Units:    {}", order.unit_count());
    println!("  Estimated total (current prices): {total}");
    Ok(())
}

pub async fn set_order_status(ctx: &AdminContext, id: &str, status: &str) -> Result<(), CliError> {
    let status = parse_status(status)?;
    ctx.client()
        .update_order_status(&OrderId::new(id), status)
        .await
        .map_err(AdminError::from)?;
    println!("Order status updated to {status}.");
    Ok(())
}

fn parse_status(raw: &str) -> Result<OrderStatus, CliError> {
    raw.parse().map_err(CliError::Usage)
}

// =============================================================================
// Uploads
// =============================================================================

pub async fn upload(ctx: &AdminContext, files: &[PathBuf], product: Option<&str>) -> Result<(), CliError> {
    let target = match product {
        Some(id) => Some(find_product(ctx, &ProductId::new(id)).await?),
        None => None,
    };
    let existing = target.as_ref().map_or(0, |p| p.images.len());

    let urls = ctx.upload_images(files, existing).await?;
    println!("{} image(s) uploaded successfully", urls.len());
    for url in &urls {
        println!("  {url}");
    }

    if let Some(product) = target {
        let mut input = product.to_input();
        input.images.extend(urls);
        ctx.client()
            .update_product(&product.id, &input)
            .await
            .map_err(AdminError::from)?;
        println!("Attached to {} ({} image(s)).", product.name, input.images.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_overrides_only_given_fields() {
        let mut form = ProductForm {
            name: "Old".into(),
            price: "100".into(),
            sizes: "S, M".into(),
            ..ProductForm::default()
        };
        ProductEdit {
            price: Some("120".into()),
            in_stock: Some(false),
            ..ProductEdit::default()
        }
        .apply(&mut form);

        assert_eq!(form.name, "Old");
        assert_eq!(form.price, "120");
        assert_eq!(form.sizes, "S, M");
        assert!(!form.in_stock);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Shipped").ok(), Some(OrderStatus::Shipped));
        assert!(matches!(parse_status("lost"), Err(CliError::Usage(_))));
    }
}
