//! Integration test support for the Prasanna Farm storefront.
//!
//! Provides [`FakeFarmService`], an in-process axum server that speaks the
//! remote REST contract (`/api/cart`, `/api/products`, `/api/categories`)
//! so the storefront's remote and fallback paths can be exercised end to
//! end without a real backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p prasanna-farm-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_remote` - Cart reconciliation against a healthy or failing service
//! - `catalog_fallback` - Catalog reads with remote, failing and no service

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path as UrlPath, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use prasanna_farm_core::{Cart, CartMutation, Category, CategoryId, Price, Product, ProductId};
use prasanna_farm_storefront::api::types::{AddItemRequest, Page, RemoteCart, UpdateItemRequest};
use prasanna_farm_storefront::catalog::StaticCatalog;
use prasanna_farm_storefront::config::{RemoteConfig, StorefrontConfig};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Id of a product only the fake service knows about.
pub const REMOTE_ONLY_PRODUCT: &str = "grain-saffron";

// =============================================================================
// FakeFarmService
// =============================================================================

/// In-process fake of the remote storefront service.
///
/// The server is aborted when the value is dropped.
pub struct FakeFarmService {
    addr: SocketAddr,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

struct FakeState {
    cart: Mutex<Cart>,
    catalog: StaticCatalog,
    failing: AtomicBool,
    requests: AtomicUsize,
}

impl FakeFarmService {
    /// Bind to an ephemeral localhost port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let builtin = StaticCatalog::builtin();
        let mut products = builtin.products().to_vec();
        products.push(remote_only_product());
        let catalog = StaticCatalog::new(builtin.categories().to_vec(), products);

        let state = Arc::new(FakeState {
            cart: Mutex::new(Cart::new()),
            catalog,
            failing: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Base URL including the `/api` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Remote settings pointing at this service with a short timeout.
    #[must_use]
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.base_url(),
            auth_token: None,
            timeout: Duration::from_secs(5),
        }
    }

    /// Storefront settings using this service and `data_dir`, with no
    /// checkout delay.
    #[must_use]
    pub fn config(&self, data_dir: &Path) -> StorefrontConfig {
        let mut config = StorefrontConfig::local(data_dir);
        config.remote = Some(self.remote_config());
        config.checkout_delay = Duration::ZERO;
        config
    }

    /// Make every endpoint answer 503 (or recover).
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// The server-side cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state.cart().clone()
    }

    /// Replace the server-side cart.
    pub fn seed_cart(&self, cart: Cart) {
        *self.state.cart() = cart;
    }

    /// Number of requests received, including rejected ones.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeFarmService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A base URL where nothing is listening.
///
/// # Errors
///
/// Returns an error if a probe port cannot be bound.
pub async fn unreachable_remote() -> std::io::Result<RemoteConfig> {
    let probe = TcpListener::bind("127.0.0.1:0").await?;
    let addr = probe.local_addr()?;
    drop(probe);

    Ok(RemoteConfig {
        base_url: format!("http://{addr}/api"),
        auth_token: None,
        timeout: Duration::from_secs(2),
    })
}

fn remote_only_product() -> Product {
    Product {
        id: ProductId::new(REMOTE_ONLY_PRODUCT),
        name: "Kashmiri Saffron".to_string(),
        description: "Hand-picked saffron threads".to_string(),
        price: Price::from_rupees(320),
        original_price: None,
        image: String::new(),
        category: CategoryId::new("grains"),
        rating: 4.8,
        reviews: 12,
        is_organic: true,
        is_fresh: false,
        unit: "1 g".to_string(),
        stock: 8,
    }
}

impl FakeState {
    fn cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, mutation: &CartMutation) -> RemoteCart {
        let mut cart = self.cart();
        cart.apply(mutation);
        RemoteCart::from(&*cart)
    }
}

// =============================================================================
// Routes
// =============================================================================

type Shared = State<Arc<FakeState>>;

fn router(state: Arc<FakeState>) -> Router {
    let api = Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/{id}", put(update_item).delete(remove_item))
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/products/category/{id}", get(products_by_category))
        .route("/products/{id}", get(get_product))
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
        .layer(middleware::from_fn_with_state(state.clone(), gate))
        .with_state(state);

    Router::new().nest("/api", api)
}

/// Error body in the service's `{"message": ...}` shape.
struct ServiceError(StatusCode, String);

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

async fn gate(State(state): Shared, request: Request, next: Next) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return ServiceError(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable".to_string(),
        )
        .into_response();
    }
    next.run(request).await
}

async fn get_cart(State(state): Shared) -> Json<RemoteCart> {
    Json(RemoteCart::from(&*state.cart()))
}

async fn add_item(
    State(state): Shared,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<RemoteCart>, ServiceError> {
    let product = state
        .catalog
        .product(&request.product_id)
        .cloned()
        .ok_or_else(|| {
            ServiceError(
                StatusCode::NOT_FOUND,
                format!("Product not found: {}", request.product_id),
            )
        })?;
    Ok(Json(state.mutate(&CartMutation::Add {
        product,
        quantity: request.quantity,
    })))
}

async fn update_item(
    State(state): Shared,
    UrlPath(id): UrlPath<String>,
    Json(request): Json<UpdateItemRequest>,
) -> Json<RemoteCart> {
    Json(state.mutate(&CartMutation::update_quantity(
        ProductId::new(id),
        i64::from(request.quantity),
    )))
}

async fn remove_item(State(state): Shared, UrlPath(id): UrlPath<String>) -> Json<RemoteCart> {
    Json(state.mutate(&CartMutation::Remove {
        product_id: ProductId::new(id),
    }))
}

async fn clear_cart(State(state): Shared) -> StatusCode {
    state.mutate(&CartMutation::Clear);
    StatusCode::NO_CONTENT
}

async fn list_products(State(state): Shared) -> Json<Page<Product>> {
    let content = state.catalog.products().to_vec();
    let total_elements = content.len() as u64;
    Json(Page {
        content,
        total_pages: 1,
        total_elements,
        current_page: 0,
    })
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

async fn search_products(
    State(state): Shared,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Product>> {
    Json(state.catalog.search(&params.q))
}

async fn products_by_category(
    State(state): Shared,
    UrlPath(id): UrlPath<String>,
) -> Json<Vec<Product>> {
    Json(state.catalog.products_by_category(&CategoryId::new(id)))
}

async fn get_product(
    State(state): Shared,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Product>, ServiceError> {
    state
        .catalog
        .product(&ProductId::new(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| ServiceError(StatusCode::NOT_FOUND, format!("Product not found: {id}")))
}

async fn list_categories(State(state): Shared) -> Json<Vec<Category>> {
    Json(state.catalog.categories().to_vec())
}

async fn get_category(
    State(state): Shared,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Category>, ServiceError> {
    state
        .catalog
        .category(&CategoryId::new(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| ServiceError(StatusCode::NOT_FOUND, format!("Category not found: {id}")))
}
