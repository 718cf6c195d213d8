//! JSON endpoints over one shared storefront session.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::admin::{ProductDraft, SalesOverview};
use crate::catalog::{ProductFilter, SortKey};
use crate::domain::{CartItem, CartTotals, Category, Order, OrderStatus, Product, Role, StockLevel, User};
use crate::identity::Registration;
use crate::storage::KeyValueStore;
use crate::{Storefront, StorefrontError};

pub type SharedStorefront = Arc<Mutex<Storefront<Box<dyn KeyValueStore>>>>;

#[derive(Clone)]
pub struct AppState {
    pub shop: SharedStorefront,
    pub checkout_delay: Duration,
}

impl AppState {
    pub fn new(shop: Storefront<Box<dyn KeyValueStore>>, checkout_delay: Duration) -> Self {
        Self { shop: Arc::new(Mutex::new(shop)), checkout_delay }
    }
}

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub fn status_of(e: &StorefrontError) -> StatusCode {
    match e {
        StorefrontError::InvalidCredentials | StorefrontError::Unauthenticated => StatusCode::UNAUTHORIZED,
        StorefrontError::Unauthorized => StatusCode::FORBIDDEN,
        StorefrontError::ProductNotFound | StorefrontError::CategoryNotFound | StorefrontError::ItemNotFound => StatusCode::NOT_FOUND,
        StorefrontError::EmailAlreadyExists | StorefrontError::OutOfStock => StatusCode::CONFLICT,
        StorefrontError::EmptyCart | StorefrontError::CurrencyMismatch | StorefrontError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StorefrontError::Storage(_) | StorefrontError::Serialization(_) | StorefrontError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(e: StorefrontError) -> (StatusCode, String) {
    let status = status_of(&e);
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, e.to_string())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "furnish-storefront"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:slug", get(get_product))
        .route("/api/v1/products/:slug/related", get(related_products))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/categories/:slug", get(get_category))
        .route("/api/v1/search", get(search))
        .route("/api/v1/suggestions", get(suggestions))
        .route("/api/v1/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/:product_id", put(update_cart_item).delete(remove_cart_item))
        .route("/api/v1/checkout", post(checkout))
        .route("/api/v1/orders", get(list_orders))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/admin/products", get(admin_list_products).post(admin_create_product))
        .route("/api/v1/admin/products/:id", put(admin_update_product).delete(admin_delete_product))
        .route("/api/v1/admin/overview", get(admin_overview))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(alias = "q")]
    pub text: Option<String>,
    /// Comma-separated category names.
    pub categories: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<SortKey>,
}

impl ListParams {
    fn into_filter(self) -> ProductFilter {
        let categories: Vec<String> = self
            .categories
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        ProductFilter { text: self.text, categories, price_min: self.min_price, price_max: self.max_price, sort: self.sort.unwrap_or_default() }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListing { pub data: Vec<Product>, pub total: usize, pub categories: Vec<String> }

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage { pub product: Product, pub stock_level: StockLevel, pub related: Vec<Product> }

#[derive(Debug, Serialize)]
pub struct CategoryPage { pub category: Category, pub products: Vec<Product> }

#[derive(Debug, Serialize)]
pub struct SearchResults { pub query: String, pub products: Vec<Product> }

#[derive(Debug, Deserialize)] pub struct SearchParams { #[serde(default)] pub q: String }

fn owned(products: Vec<&Product>) -> Vec<Product> { products.into_iter().cloned().collect() }

async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Json<ProductListing> {
    let shop = s.shop.lock().await;
    let data = owned(shop.catalog().query(&p.into_filter()));
    let categories = shop.catalog().category_names().into_iter().map(str::to_string).collect();
    Json(ProductListing { total: data.len(), data, categories })
}

async fn get_product(State(s): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<ProductPage>> {
    let shop = s.shop.lock().await;
    let product = shop.catalog().product_by_slug(&slug).map_err(reject)?;
    let related = owned(shop.catalog().related_products(product));
    Ok(Json(ProductPage { stock_level: product.stock_level(), product: product.clone(), related }))
}

async fn related_products(State(s): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<Vec<Product>>> {
    let shop = s.shop.lock().await;
    let product = shop.catalog().product_by_slug(&slug).map_err(reject)?;
    Ok(Json(owned(shop.catalog().related_products(product))))
}

async fn list_categories(State(s): State<AppState>) -> Json<Vec<Category>> {
    Json(s.shop.lock().await.catalog().categories().to_vec())
}

async fn get_category(State(s): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<CategoryPage>> {
    let shop = s.shop.lock().await;
    let category = shop.catalog().category_by_slug(&slug).map_err(reject)?.clone();
    let products = owned(shop.catalog().products_in_category(&slug));
    Ok(Json(CategoryPage { category, products }))
}

async fn search(State(s): State<AppState>, Query(p): Query<SearchParams>) -> Json<SearchResults> {
    let shop = s.shop.lock().await;
    let products = owned(shop.catalog().search(&p.q));
    Json(SearchResults { query: p.q, products })
}

async fn suggestions(State(s): State<AppState>, Query(p): Query<SearchParams>) -> Json<Vec<Product>> {
    Json(owned(s.shop.lock().await.catalog().suggestions(&p.q)))
}

// =============================================================================
// Cart & checkout
// =============================================================================

#[derive(Debug, Serialize)]
pub struct CartView { pub items: Vec<CartItem>, pub totals: CartTotals }

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest { pub product_id: String, pub quantity: Option<u32> }

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest { pub quantity: u32 }

fn cart_view(shop: &Storefront<Box<dyn KeyValueStore>>) -> CartView {
    CartView { items: shop.cart().cart().items().to_vec(), totals: shop.cart_totals() }
}

async fn get_cart(State(s): State<AppState>) -> Json<CartView> {
    Json(cart_view(&*s.shop.lock().await))
}

async fn add_to_cart(State(s): State<AppState>, Json(r): Json<AddToCartRequest>) -> ApiResult<Json<CartView>> {
    let mut shop = s.shop.lock().await;
    shop.add_to_cart(&r.product_id, r.quantity.unwrap_or(1)).map_err(reject)?;
    Ok(Json(cart_view(&shop)))
}

async fn update_cart_item(State(s): State<AppState>, Path(product_id): Path<String>, Json(r): Json<UpdateQuantityRequest>) -> ApiResult<Json<CartView>> {
    let mut shop = s.shop.lock().await;
    shop.update_cart_quantity(&product_id, r.quantity).map_err(reject)?;
    Ok(Json(cart_view(&shop)))
}

async fn remove_cart_item(State(s): State<AppState>, Path(product_id): Path<String>) -> ApiResult<Json<CartView>> {
    let mut shop = s.shop.lock().await;
    shop.remove_from_cart(&product_id).map_err(reject)?;
    Ok(Json(cart_view(&shop)))
}

async fn clear_cart(State(s): State<AppState>) -> ApiResult<StatusCode> {
    s.shop.lock().await.clear_cart().map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fails fast without a session or items, otherwise waits out the simulated
/// processing delay before recording the order.
async fn checkout(State(s): State<AppState>) -> ApiResult<(StatusCode, Json<Order>)> {
    {
        let shop = s.shop.lock().await;
        if shop.current_user().is_none() { return Err(reject(StorefrontError::Unauthenticated)); }
        if shop.cart().is_empty() { return Err(reject(StorefrontError::EmptyCart)); }
    }
    tokio::time::sleep(s.checkout_delay).await;
    let order = s.shop.lock().await.checkout().map_err(reject)?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)] pub struct OrderParams { pub status: Option<OrderStatus> }

async fn list_orders(State(s): State<AppState>, Query(p): Query<OrderParams>) -> ApiResult<Json<Vec<Order>>> {
    let shop = s.shop.lock().await;
    Ok(Json(shop.order_history(p.status).map_err(reject)?))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest { pub email: String, pub password: String, pub role: Option<Role> }

async fn login(State(s): State<AppState>, Json(r): Json<LoginRequest>) -> ApiResult<Json<User>> {
    let user = s.shop.lock().await.login(&r.email, &r.password, r.role).map_err(reject)?;
    Ok(Json(user))
}

async fn register(State(s): State<AppState>, Json(r): Json<Registration>) -> ApiResult<(StatusCode, Json<User>)> {
    let user = s.shop.lock().await.register(r).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn logout(State(s): State<AppState>) -> ApiResult<StatusCode> {
    s.shop.lock().await.logout().map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(s): State<AppState>) -> ApiResult<Json<User>> {
    let shop = s.shop.lock().await;
    shop.current_user().cloned().map(Json).ok_or_else(|| reject(StorefrontError::Unauthenticated))
}

// =============================================================================
// Admin
// =============================================================================

async fn admin_list_products(State(s): State<AppState>, Query(p): Query<SearchParams>) -> ApiResult<Json<Vec<Product>>> {
    let shop = s.shop.lock().await;
    Ok(Json(owned(shop.admin_inventory(&p.q).map_err(reject)?)))
}

async fn admin_create_product(State(s): State<AppState>, Json(r): Json<ProductDraft>) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = s.shop.lock().await.admin_create_product(r).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn admin_update_product(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<ProductDraft>) -> ApiResult<Json<Product>> {
    Ok(Json(s.shop.lock().await.admin_update_product(&id, r).map_err(reject)?))
}

async fn admin_delete_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.shop.lock().await.admin_delete_product(&id).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_overview(State(s): State<AppState>) -> ApiResult<Json<SalesOverview>> {
    Ok(Json(s.shop.lock().await.admin_overview().map_err(reject)?))
}
