//! Catalog browsing commands.

use rakhshan_core::{NOT_APPLICABLE, Product, ProductId};
use rakhshan_storefront::{AppError, StorefrontContext};
use rakhshan_storefront::catalog::{self, CatalogQuery, SortOrder};

use super::CliError;

pub async fn list(ctx: &StorefrontContext, category: Option<&str>, sort: SortOrder) -> Result<(), CliError> {
    let query = CatalogQuery::new(category, sort);
    let products = ctx.browse(&query).await?;

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in &products {
        println!("{}", product_row(product));
    }
    println!("{} product(s)", products.len());
    Ok(())
}

pub async fn show(ctx: &StorefrontContext, id: &str) -> Result<(), CliError> {
    let product = ctx
        .api()
        .get_product(&ProductId::new(id))
        .await
        .map_err(AppError::from)?;

    println!("{}", product.name);
    println!("  ID:          {}", product.id);
    println!("  Price:       {}", product.price);
    println!("  Category:    {}", product.category);
    println!("  Sizes:       {}", list_or_na(&product.sizes));
    println!("  Colors:      {}", list_or_na(&product.colors));
    println!("  Stock:       {}", stock_label(&product));
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    for image in &product.images {
        println!("  Image: {image}");
    }
    Ok(())
}

pub async fn categories(ctx: &StorefrontContext) -> Result<(), CliError> {
    let products = ctx.browse(&CatalogQuery::default()).await?;
    println!("All");
    for category in catalog::categories(&products) {
        println!("{category}");
    }
    Ok(())
}

pub fn product_row(product: &Product) -> String {
    format!(
        "{:<26} {:<32} {:>10}  {:<12} {}",
        product.id.as_str(),
        product.name,
        product.price.to_string(),
        product.category,
        stock_label(product)
    )
}

const fn stock_label(product: &Product) -> &'static str {
    if product.in_stock { "In stock" } else { "Out of stock" }
}

fn list_or_na(values: &[String]) -> String {
    if values.is_empty() {
        NOT_APPLICABLE.to_string()
    } else {
        values.join(", ")
    }
}
