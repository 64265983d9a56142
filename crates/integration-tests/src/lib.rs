//! Integration tests for Rakhshan.
//!
//! The tests run the storefront and admin libraries against [`MockBackend`],
//! an in-process `axum` server that speaks the same REST contract as the
//! production backend and keeps everything in memory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rakhshan-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront` - Catalog browsing, cart and checkout flows
//! - `admin` - Login, product and order management, image uploads

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use rakhshan_admin::config::AdminConfig;
use rakhshan_core::{NewOrder, Order, OrderId, OrderStatus, Price, Product, ProductId, ProductInput};
use rakhshan_storefront::api::REQUEST_ID_HEADER;
use rakhshan_storefront::config::{ApiConfig, StorefrontConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

/// Username accepted by the mock login endpoint.
pub const ADMIN_USERNAME: &str = "admin";
/// Password accepted by the mock login endpoint.
pub const ADMIN_PASSWORD: &str = "hunter2";
/// Bearer token handed out on login.
pub const ACCESS_TOKEN: &str = "mock-access-token";

/// Base URL reported for uploaded images.
const CDN_BASE: &str = "https://cdn.rakhshan.test/uploads";

type Shared = Arc<Mutex<Store>>;
type Rejection = (StatusCode, Json<Value>);
type Reply<T> = Result<Json<T>, Rejection>;

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    products: Vec<Product>,
    orders: Vec<Order>,
    uploads: Vec<String>,
    product_requests: usize,
    request_ids: Vec<String>,
    fail_orders: bool,
    fail_uploads: bool,
    drop_last_upload: bool,
}

impl Store {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, Store> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn detail(status: StatusCode, message: &str) -> Rejection {
    (status, Json(json!({ "detail": message })))
}

fn authorize(headers: &HeaderMap) -> Result<(), Rejection> {
    let expected = format!("Bearer {ACCESS_TOKEN}");
    let given = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if given == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }
}

fn product_from_input(id: String, input: ProductInput) -> Product {
    Product {
        id: ProductId::new(id),
        name: input.name,
        price: input.price,
        category: input.category,
        images: input.images,
        description: input.description,
        sizes: input.sizes,
        colors: input.colors,
        in_stock: input.in_stock,
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(Form(form): Form<LoginForm>) -> Reply<Value> {
    if form.username == ADMIN_USERNAME && form.password == ADMIN_PASSWORD {
        Ok(Json(json!({ "access_token": ACCESS_TOKEN, "token_type": "bearer" })))
    } else {
        Err(detail(StatusCode::UNAUTHORIZED, "Incorrect username or password"))
    }
}

async fn list_products(State(state): State<Shared>, headers: HeaderMap) -> Json<Vec<Product>> {
    let mut store = lock(&state);
    store.product_requests += 1;
    if let Some(id) = headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
        store.request_ids.push(id.to_string());
    }
    Json(store.products.clone())
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Reply<Product> {
    let mut store = lock(&state);
    store.product_requests += 1;
    store
        .products
        .iter()
        .find(|p| p.id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Product not found"))
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<ProductInput>,
) -> Reply<Product> {
    authorize(&headers)?;
    let mut store = lock(&state);
    let id = store.next_id();
    let product = product_from_input(id, input);
    store.products.push(product.clone());
    Ok(Json(product))
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Reply<Product> {
    authorize(&headers)?;
    let mut store = lock(&state);
    let slot = store
        .products
        .iter_mut()
        .find(|p| p.id.as_str() == id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Product not found"))?;
    *slot = product_from_input(id, input);
    Ok(Json(slot.clone()))
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    authorize(&headers)?;
    let mut store = lock(&state);
    let before = store.products.len();
    store.products.retain(|p| p.id.as_str() != id);
    if store.products.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Product not found"));
    }
    Ok(Json(json!({ "message": "Product deleted" })))
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Reply<Vec<Order>> {
    authorize(&headers)?;
    Ok(Json(lock(&state).orders.clone()))
}

async fn create_order(State(state): State<Shared>, Json(order): Json<NewOrder>) -> Reply<Value> {
    let mut store = lock(&state);
    if store.fail_orders {
        return Err(detail(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable"));
    }
    if order.items.is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "Order has no items"));
    }
    let id = store.next_id();
    store.orders.push(Order {
        id: OrderId::new(id.clone()),
        items: order.items,
        customer_name: order.customer_name,
        phone_number: order.phone_number,
        address: order.address,
        status: OrderStatus::Pending,
        email: None,
        created_at: None,
    });
    Ok(Json(json!({ "_id": id, "message": "Order created" })))
}

#[derive(Deserialize)]
struct StatusQuery {
    status: OrderStatus,
}

async fn update_order_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Reply<Value> {
    authorize(&headers)?;
    let mut store = lock(&state);
    let order = store
        .orders
        .iter_mut()
        .find(|o| o.id.as_str() == id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Order not found"))?;
    order.status = query.status;
    Ok(Json(json!({ "message": "Status updated" })))
}

async fn upload_images(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply<Value> {
    authorize(&headers)?;
    let mut names = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| detail(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        let name = field.file_name().unwrap_or("image").to_string();
        field
            .bytes()
            .await
            .map_err(|e| detail(StatusCode::BAD_REQUEST, &e.to_string()))?;
        names.push(name);
    }

    let mut store = lock(&state);
    if store.fail_uploads {
        return Ok(Json(json!({ "success": false, "uploaded": [] })));
    }
    let mut uploaded: Vec<Value> = names
        .iter()
        .map(|name| json!({ "url": format!("{CDN_BASE}/{name}"), "filename": name }))
        .collect();
    if store.drop_last_upload {
        uploaded.pop();
    }
    store.uploads.extend(names);
    Ok(Json(json!({ "success": true, "uploaded": uploaded })))
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/upload/images", post(upload_images))
        .with_state(state)
}

// =============================================================================
// MockBackend
// =============================================================================

/// In-memory REST backend bound to a random local port.
///
/// The server task is aborted when the backend is dropped.
#[derive(Debug)]
pub struct MockBackend {
    base_url: Url,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend with an empty catalog.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Shared::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = Url::parse(&format!("http://{addr}/")).expect("Invalid mock URL");

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            server,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// API settings pointing at this backend, with the catalog cache disabled.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which cannot happen for a bound
    /// local address.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.base_url.as_str()).expect("mock URL is valid")
    }

    /// API settings with a catalog cache of the given lifetime.
    #[must_use]
    pub fn cached_api_config(&self, ttl: Duration) -> ApiConfig {
        ApiConfig {
            catalog_cache_ttl: ttl,
            ..self.api_config()
        }
    }

    /// Storefront settings pointing at this backend.
    #[must_use]
    pub fn storefront_config(&self, cart_path: PathBuf) -> StorefrontConfig {
        StorefrontConfig {
            api: self.api_config(),
            cart_path,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Admin settings pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the settings are rejected, which cannot happen for a bound
    /// local address.
    #[must_use]
    pub fn admin_config(&self, session_path: PathBuf) -> AdminConfig {
        let base_url = self.base_url.to_string();
        let session_path = session_path.to_string_lossy().into_owned();
        AdminConfig::from_vars(|key| match key {
            "RAKHSHAN_API_URL" => Some(base_url.clone()),
            "RAKHSHAN_ADMIN_SESSION_PATH" => Some(session_path.clone()),
            "RAKHSHAN_ADMIN_PASSWORD" => Some(ADMIN_PASSWORD.to_string()),
            _ => None,
        })
        .expect("mock admin config is valid")
    }

    /// Add a product directly to the catalog.
    pub fn insert_product(&self, input: ProductInput) -> Product {
        let mut store = lock(&self.state);
        let id = store.next_id();
        let product = product_from_input(id, input);
        store.products.push(product.clone());
        product
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.state).products.clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.state).orders.clone()
    }

    /// File names received by the upload endpoint.
    #[must_use]
    pub fn uploads(&self) -> Vec<String> {
        lock(&self.state).uploads.clone()
    }

    /// Number of product reads served so far.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        lock(&self.state).product_requests
    }

    /// Request ids seen on catalog listings.
    #[must_use]
    pub fn request_ids(&self) -> Vec<String> {
        lock(&self.state).request_ids.clone()
    }

    /// Make `POST /orders` answer with a server error.
    pub fn fail_orders(&self, fail: bool) {
        lock(&self.state).fail_orders = fail;
    }

    /// Make `POST /upload/images` report failure.
    pub fn fail_uploads(&self, fail: bool) {
        lock(&self.state).fail_uploads = fail;
    }

    /// Make `POST /upload/images` report success but leave the last file out
    /// of its `uploaded` list.
    pub fn drop_last_upload(&self, enabled: bool) {
        lock(&self.state).drop_last_upload = enabled;
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Build a product body.
///
/// # Panics
///
/// Panics if `price` is not a valid price.
#[must_use]
pub fn product_input(name: &str, price: &str, category: &str, sizes: &[&str], colors: &[&str]) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price: price.parse::<Price>().expect("valid price"),
        category: category.to_string(),
        description: String::new(),
        images: Vec::new(),
        sizes: sizes.iter().map(ToString::to_string).collect(),
        colors: colors.iter().map(ToString::to_string).collect(),
        in_stock: true,
    }
}
