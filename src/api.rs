//! JSON facade over a [`CartStore`] for the storefront clients

use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{delete, get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;

use crate::domain::aggregates::{CartError, OrderSubmissionResult, Product};
use crate::domain::events::AnalyticsEvent;
use crate::domain::value_objects::{ProductId, Quantity};
use crate::store::{CartStore, StoreSnapshot};
use crate::StoreError;

#[derive(Clone)] pub struct AppState { pub store: Arc<CartStore> }

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub fn router(store: Arc<CartStore>) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-cart"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/cart", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/items", post(add_to_cart))
        .route("/api/v1/cart/items/:product_id", delete(remove_from_cart).put(update_quantity))
        .route("/api/v1/cart/options/:option_id/toggle", post(toggle_option))
        .route("/api/v1/checkout", post(checkout))
        .route("/api/v1/analytics/events", get(list_events))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(AppState { store })
}

fn reject(e: impl Into<StoreError>) -> (StatusCode, String) {
    let e = e.into();
    let status = match &e {
        StoreError::Cart(CartError::ProductNotFound(_)) => StatusCode::NOT_FOUND,
        StoreError::Cart(CartError::InvalidQuantity) => StatusCode::BAD_REQUEST,
        StoreError::Cart(CartError::InsufficientStock { .. }) => StatusCode::CONFLICT,
        StoreError::NoRuntime | StoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

#[derive(Debug, Deserialize)] pub struct ListParams { pub page: Option<u32>, pub per_page: Option<u32>, pub search: Option<String> }
#[derive(Debug, Serialize)] pub struct PaginatedResponse<T> { pub data: Vec<T>, pub total: usize, pub page: u32 }

async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Json<PaginatedResponse<Product>> {
    let page = p.page.unwrap_or(1).max(1); let per_page = p.per_page.unwrap_or(20).clamp(1, 100);
    let matches = s.store.search_products(p.search.as_deref().unwrap_or_default());
    let total = matches.len();
    let offset = (page as usize - 1).saturating_mul(per_page as usize);
    let data = matches.into_iter().skip(offset).take(per_page as usize).collect();
    Json(PaginatedResponse { data, total, page })
}

async fn get_product(State(s): State<AppState>, Path(id): Path<u64>) -> ApiResult<Json<Product>> {
    s.store.product(ProductId::new(id)).map(Json).ok_or_else(|| reject(CartError::ProductNotFound(ProductId::new(id))))
}

async fn get_cart(State(s): State<AppState>) -> Json<StoreSnapshot> { Json(s.store.snapshot()) }

fn one() -> u32 { 1 }

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub product_id: u64,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 1000))]
    pub quantity: u32,
}

async fn add_to_cart(State(s): State<AppState>, Json(r): Json<AddToCartRequest>) -> ApiResult<(StatusCode, Json<StoreSnapshot>)> {
    r.validate().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    s.store.add_product(ProductId::new(r.product_id), Quantity::new(r.quantity)).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(s.store.snapshot())))
}

#[derive(Debug, Deserialize)] pub struct UpdateQuantityRequest { pub quantity: i64 }

async fn update_quantity(State(s): State<AppState>, Path(id): Path<u64>, Json(r): Json<UpdateQuantityRequest>) -> ApiResult<Json<StoreSnapshot>> {
    s.store.update_quantity(ProductId::new(id), r.quantity).map_err(reject)?;
    Ok(Json(s.store.snapshot()))
}

async fn remove_from_cart(State(s): State<AppState>, Path(id): Path<u64>) -> Json<StoreSnapshot> {
    s.store.remove_from_cart(ProductId::new(id));
    Json(s.store.snapshot())
}

async fn clear_cart(State(s): State<AppState>) -> StatusCode {
    s.store.clear_cart();
    StatusCode::NO_CONTENT
}

async fn toggle_option(State(s): State<AppState>, Path(option_id): Path<String>) -> ApiResult<Json<StoreSnapshot>> {
    s.store.toggle_option(&option_id).ok_or((StatusCode::NOT_FOUND, format!("Unknown order option: {option_id}")))?;
    Ok(Json(s.store.snapshot()))
}

async fn checkout(State(s): State<AppState>) -> ApiResult<(StatusCode, Json<OrderSubmissionResult>)> {
    if s.store.is_loading() { return Err((StatusCode::CONFLICT, "A submission is already in progress".to_string())); }
    let result = s.store.submit_order().await;
    let status = if result.success { StatusCode::OK } else { StatusCode::UNPROCESSABLE_ENTITY };
    Ok((status, Json(result)))
}

async fn list_events(State(s): State<AppState>) -> Json<Vec<AnalyticsEvent>> { Json(s.store.analytics_events()) }
