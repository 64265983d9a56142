//! Admin console flows against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rakhshan_admin::client::UPLOAD_FAILED;
use rakhshan_admin::dashboard;
use rakhshan_admin::orders::OrderTotal;
use rakhshan_admin::products::ProductForm;
use rakhshan_admin::uploads::UploadError;
use rakhshan_admin::{AdminApiError, AdminContext, AdminError};
use rakhshan_core::price::format_amount;
use rakhshan_core::{OrderId, OrderStatus, Quantity};
use rakhshan_integration_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, MockBackend, product_input};
use rakhshan_storefront::StorefrontContext;
use rakhshan_storefront::cart::{LineSelection, MemoryCartStore};
use rakhshan_storefront::checkout::{CheckoutForm, place_order};
use secrecy::SecretString;
use tempfile::TempDir;

async fn logged_in(backend: &MockBackend, dir: &TempDir) -> AdminContext {
    let mut ctx = AdminContext::new(backend.admin_config(dir.path().join("session.json"))).await;
    ctx.login(ADMIN_USERNAME, &SecretString::from(ADMIN_PASSWORD))
        .await
        .unwrap();
    ctx
}

/// Place an order through the storefront, as a shopper would.
async fn shopper_order(backend: &MockBackend, product: &rakhshan_core::ProductId, qty: u32) -> OrderId {
    let mut shop = StorefrontContext::with_store(
        backend.storefront_config("unused.json".into()),
        MemoryCartStore::new(),
    );
    shop.add_to_cart(
        product,
        LineSelection::default().with_quantity(Quantity::new(qty).unwrap()),
    )
    .await
    .unwrap();
    place_order(&mut shop, &CheckoutForm::new("Bilal", "03211234567", "Karachi"))
        .await
        .unwrap()
        .id
        .unwrap()
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let mut ctx = AdminContext::new(backend.admin_config(dir.path().join("session.json"))).await;

    let err = ctx
        .login(ADMIN_USERNAME, &SecretString::from("wrong"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdminError::Api(AdminApiError::AuthenticationFailed(ref msg)) if msg == "Invalid credentials"
    ));
    assert!(ctx.username().is_none());
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_requests_need_login() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let ctx = AdminContext::new(backend.admin_config(dir.path().join("session.json"))).await;

    let err = ctx.orders_with_totals().await.unwrap_err();
    assert!(matches!(err, AdminError::Api(AdminApiError::NoAccessToken)));
    assert_eq!(err.user_message(), "You are not logged in. Please log in first.");
}

#[tokio::test]
async fn test_session_survives_restart_until_logout() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    drop(logged_in(&backend, &dir).await);

    let mut resumed = AdminContext::new(backend.admin_config(dir.path().join("session.json"))).await;
    assert_eq!(resumed.username(), Some(ADMIN_USERNAME));
    assert!(resumed.client().list_products().await.unwrap().is_empty());

    resumed.logout().await.unwrap();
    assert!(!resumed.client().has_token().await);

    let fresh = AdminContext::new(backend.admin_config(dir.path().join("session.json"))).await;
    assert!(fresh.username().is_none());
}

#[tokio::test]
async fn test_product_crud() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let ctx = logged_in(&backend, &dir).await;
    let client = ctx.client();

    let form = ProductForm {
        name: "Classic White Kufi".into(),
        price: "850".into(),
        category: "Traditional".into(),
        sizes: "S, M, ,L".into(),
        ..ProductForm::default()
    };
    let created = client.create_product(&form.to_input().unwrap()).await.unwrap();
    assert_eq!(created.sizes, ["S", "M", "L"]);
    assert!(created.in_stock);

    let mut edit = ProductForm::from_product(&created);
    edit.price = "900.50".into();
    edit.in_stock = false;
    let updated = client
        .update_product(&created.id, &edit.to_input().unwrap())
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.price.to_string(), "900.50");
    assert!(!backend.products()[0].in_stock);

    client.delete_product(&created.id).await.unwrap();
    assert!(backend.products().is_empty());

    let err = client.delete_product(&created.id).await.unwrap_err();
    assert!(matches!(&err, AdminApiError::Api(api) if api.status() == Some(404)));
}

#[tokio::test]
async fn test_orders_totals_and_status() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let kufi = backend.insert_product(product_input("Kufi", "850", "Traditional", &[], &[]));
    let cap = backend.insert_product(product_input("Cap", "650", "Modern", &[], &[]));
    let first = shopper_order(&backend, &kufi.id, 2).await;
    let second = shopper_order(&backend, &cap.id, 1).await;

    let ctx = logged_in(&backend, &dir).await;

    let orders = ctx.orders_with_totals().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].1.to_string(), "1700.00");
    assert!(orders.iter().all(|(o, _)| o.status == OrderStatus::Pending));

    ctx.client()
        .update_order_status(&first, OrderStatus::Shipped)
        .await
        .unwrap();
    let (order, _) = ctx.find_order(&first).await.unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);

    // Deleting a product leaves its orders without an estimate.
    ctx.client().delete_product(&cap.id).await.unwrap();
    let (_, total) = ctx.find_order(&second).await.unwrap();
    assert_eq!(total, OrderTotal::Unavailable);
    assert_eq!(total.to_string(), "-");

    let err = ctx.find_order(&OrderId::new("missing")).await.unwrap_err();
    assert!(matches!(err, AdminError::NotFound(_)));

    let board = dashboard::load(ctx.client()).await.unwrap();
    assert_eq!(board.stats.products, 1);
    assert_eq!(board.stats.orders, 2);
    assert_eq!(board.stats.open_orders, 2);
    assert!(board.by_status.contains(&(OrderStatus::Shipped, 1)));
}

#[tokio::test]
async fn test_order_estimate_matches_cart_total() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let kufi = backend.insert_product(product_input("Kufi", "850.25", "Traditional", &[], &[]));
    let id = shopper_order(&backend, &kufi.id, 3).await;

    let ctx = logged_in(&backend, &dir).await;
    let (_, total) = ctx.find_order(&id).await.unwrap();
    let OrderTotal::Estimated(amount) = total else {
        panic!("expected an estimate");
    };
    assert_eq!(format_amount(amount), "2550.75");
}

#[tokio::test]
async fn test_image_upload() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let ctx = logged_in(&backend, &dir).await;

    let front = dir.path().join("front.jpg");
    let side = dir.path().join("side.png");
    std::fs::write(&front, b"jpeg bytes").unwrap();
    std::fs::write(&side, b"png bytes").unwrap();

    let urls = ctx
        .upload_images(&[front.clone(), side.clone()], 0)
        .await
        .unwrap();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].ends_with("/front.jpg"));
    assert_eq!(backend.uploads(), ["front.jpg", "side.png"]);

    // Limits are checked before anything is sent.
    let err = ctx.upload_images(&[front.clone(), side.clone()], 4).await.unwrap_err();
    assert!(matches!(err, AdminError::Upload(UploadError::TooManyImages { max: 5 })));
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, b"text").unwrap();
    let err = ctx.upload_images(&[notes], 0).await.unwrap_err();
    assert!(matches!(err, AdminError::Upload(UploadError::UnsupportedType(_))));
    assert_eq!(backend.uploads().len(), 2);

    backend.drop_last_upload(true);
    let err = ctx.upload_images(&[front.clone(), side], 0).await.unwrap_err();
    assert!(matches!(
        err,
        AdminError::Api(AdminApiError::UploadFailed(ref msg)) if msg == UPLOAD_FAILED
    ));
    backend.drop_last_upload(false);

    backend.fail_uploads(true);
    let err = ctx.upload_images(&[front], 0).await.unwrap_err();
    assert!(matches!(
        err,
        AdminError::Api(AdminApiError::UploadFailed(ref msg)) if msg == UPLOAD_FAILED
    ));
}
