//! Storefront flows against the mock backend: browsing, cart and checkout.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use rakhshan_core::price::format_amount;
use rakhshan_core::{ProductId, Quantity};
use rakhshan_integration_tests::{MockBackend, product_input};
use rakhshan_storefront::api::{ApiClient, ApiError};
use rakhshan_storefront::cart::{LineSelection, MemoryCartStore, SelectionError};
use rakhshan_storefront::catalog::{CatalogQuery, SortOrder};
use rakhshan_storefront::checkout::{CheckoutError, CheckoutForm, place_order};
use rakhshan_storefront::{AppError, StorefrontContext};
use tempfile::TempDir;

fn sized(size: &str) -> LineSelection {
    LineSelection::new(Some(size.to_string()), None)
}

async fn backend_with_catalog() -> (MockBackend, ProductId, ProductId) {
    let backend = MockBackend::start().await;
    let kufi = backend.insert_product(product_input("Classic White Kufi", "850", "Traditional", &["S", "M", "L"], &[]));
    let cap = backend.insert_product(product_input("Prayer Cap", "650", "Modern", &[], &["Black", "White"]));
    backend.insert_product(product_input("Embroidered Topi", "1200", "traditional", &[], &[]));
    (backend, kufi.id, cap.id)
}

fn context(backend: &MockBackend, dir: &TempDir) -> StorefrontContext {
    StorefrontContext::new(backend.storefront_config(dir.path().join("cart.json")))
}

#[tokio::test]
async fn test_browse_filters_and_sorts() {
    let (backend, _, _) = backend_with_catalog().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&backend, &dir);

    let all = ctx.browse(&CatalogQuery::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let traditional = ctx
        .browse(&CatalogQuery::new(Some("Traditional"), SortOrder::PriceDesc))
        .await
        .unwrap();
    let names: Vec<&str> = traditional.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Embroidered Topi", "Classic White Kufi"]);

    let cheapest_first = ctx
        .browse(&CatalogQuery::new(Some("all"), SortOrder::PriceAsc))
        .await
        .unwrap();
    assert_eq!(cheapest_first[0].name, "Prayer Cap");
}

#[tokio::test]
async fn test_requests_carry_request_id() {
    let (backend, _, _) = backend_with_catalog().await;
    let client = ApiClient::new(&backend.api_config());

    client.list_products().await.unwrap();
    client.list_products().await.unwrap();

    let ids = backend.request_ids();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_catalog_cache_serves_repeat_reads() {
    let (backend, kufi, _) = backend_with_catalog().await;
    let client = ApiClient::new(&backend.cached_api_config(Duration::from_secs(60)));

    client.list_products().await.unwrap();
    client.list_products().await.unwrap();
    // Listing warms the per-product entries too.
    client.get_product(&kufi).await.unwrap();
    assert_eq!(backend.product_requests(), 1);

    client.invalidate_catalog();
    client.list_products().await.unwrap();
    assert_eq!(backend.product_requests(), 2);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let (backend, _, _) = backend_with_catalog().await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&backend, &dir);

    let err = ctx
        .add_to_cart(&ProductId::new("does-not-exist"), LineSelection::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::NotFound(_))));
    assert!(ctx.cart().is_empty());
}

#[tokio::test]
async fn test_add_merges_matching_lines_and_persists() {
    let (backend, kufi, cap) = backend_with_catalog().await;
    let dir = TempDir::new().unwrap();

    {
        let mut ctx = context(&backend, &dir);
        assert_eq!(ctx.add_to_cart(&kufi, sized("M")).await.unwrap(), 0);
        assert_eq!(
            ctx.add_to_cart(&kufi, sized("M").with_quantity(Quantity::new(2).unwrap()))
                .await
                .unwrap(),
            0
        );
        assert_eq!(ctx.add_to_cart(&kufi, sized("L")).await.unwrap(), 1);
        let black = LineSelection::new(None, Some("Black".into()));
        assert_eq!(ctx.add_to_cart(&cap, black).await.unwrap(), 2);
        assert!(ctx.cart().persistence_healthy());
    }

    // A fresh session sees the same cart.
    let ctx = context(&backend, &dir);
    let lines = ctx.cart().lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].quantity.get(), 3);
    assert_eq!(lines[1].size.as_deref(), Some("L"));
    assert_eq!(ctx.cart().item_count(), 5);
    assert_eq!(format_amount(ctx.cart().total()), "4050.00");
}

#[tokio::test]
async fn test_selection_is_validated_against_product() {
    let (backend, kufi, cap) = backend_with_catalog().await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&backend, &dir);

    let err = ctx.add_to_cart(&kufi, LineSelection::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Selection(SelectionError::SizeRequired)));

    let err = ctx.add_to_cart(&kufi, sized("XXL")).await.unwrap_err();
    assert!(matches!(err, AppError::Selection(SelectionError::UnknownSize(_))));

    let err = ctx.add_to_cart(&cap, LineSelection::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Selection(SelectionError::ColorRequired)));

    assert!(ctx.cart().is_empty());
}

#[tokio::test]
async fn test_checkout_submits_order_and_clears_cart() {
    let (backend, kufi, cap) = backend_with_catalog().await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&backend, &dir);
    ctx.add_to_cart(&kufi, sized("S").with_quantity(Quantity::new(2).unwrap()))
        .await
        .unwrap();
    ctx.add_to_cart(&cap, LineSelection::new(None, Some("White".into())))
        .await
        .unwrap();

    let form = CheckoutForm::new(" Aisha Khan ", "03001234567", "12 Mall Road, Lahore");
    let confirmation = place_order(&mut ctx, &form).await.unwrap();

    assert!(ctx.cart().is_empty());
    let orders = backend.orders();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(confirmation.id.as_ref(), Some(&order.id));
    assert_eq!(order.customer_name, "Aisha Khan");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_id, kufi);
    assert_eq!(order.items[0].qty.get(), 2);
    assert_eq!(order.items[1].size_label(), "N/A");
    assert_eq!(order.items[1].color.as_deref(), Some("White"));

    // The cleared cart was persisted too.
    assert!(context(&backend, &dir).cart().is_empty());
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let (backend, kufi, _) = backend_with_catalog().await;
    let mut ctx = StorefrontContext::with_store(
        backend.storefront_config("unused.json".into()),
        MemoryCartStore::new(),
    );
    ctx.add_to_cart(&kufi, sized("M")).await.unwrap();
    backend.fail_orders(true);

    let form = CheckoutForm::new("Aisha", "0300", "Lahore");
    let err = place_order(&mut ctx, &form).await.unwrap_err();

    match &err {
        AppError::Api(api) => {
            assert_eq!(api.status(), Some(500));
            assert!(api.is_server_fault());
            assert!(err.to_string().contains("Database unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(ctx.cart().len(), 1);
    assert!(backend.orders().is_empty());
}

#[tokio::test]
async fn test_checkout_rejects_incomplete_form_without_request() {
    let (backend, kufi, _) = backend_with_catalog().await;
    let mut ctx = StorefrontContext::with_store(
        backend.storefront_config("unused.json".into()),
        MemoryCartStore::new(),
    );

    let empty = place_order(&mut ctx, &CheckoutForm::new("Aisha", "0300", "Lahore"))
        .await
        .unwrap_err();
    assert!(matches!(empty, AppError::Checkout(CheckoutError::EmptyCart)));

    ctx.add_to_cart(&kufi, sized("M")).await.unwrap();
    let missing = place_order(&mut ctx, &CheckoutForm::new("Aisha", "   ", "Lahore"))
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::Checkout(CheckoutError::MissingField(_))));

    assert_eq!(ctx.cart().len(), 1);
    assert!(backend.orders().is_empty());
}
