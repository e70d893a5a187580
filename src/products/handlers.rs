use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::Pagination;

use super::dto::{
    CreateProductRequest, MessageResponse, ProductDetailResponse, ProductListResponse, ProductOut,
    ProductResponse, UpdateProductRequest,
};
use super::repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product", get(list_products).post(create_product))
        .route("/product/find/:term", get(search_products))
        .route(
            "/product/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[instrument(skip(state, _identity))]
async fn list_products(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = repo::list_available(&state.db, page.from, page.limit)
        .await?
        .into_iter()
        .map(ProductOut::from)
        .collect();
    Ok(Json(ProductListResponse { ok: true, products }))
}

#[instrument(skip(state, _identity))]
async fn get_product(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetailResponse>, ApiError> {
    let product = repo::find_by_id(&state.db, id)
        .await?
        .map(ProductOut::from)
        .ok_or_else(|| ApiError::Missing("Product does not exist".into()))?;
    Ok(Json(ProductDetailResponse { ok: true, product }))
}

#[instrument(skip(state, _identity))]
async fn search_products(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Path(term): Path<String>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = repo::search(&state.db, &term)
        .await?
        .into_iter()
        .map(ProductOut::from)
        .collect();
    Ok(Json(ProductListResponse { ok: true, products }))
}

#[instrument(skip(state, identity, payload))]
async fn create_product(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = repo::create(&state.db, &payload, identity.id).await?;
    info!(product_id = %product.id, "product created");
    Ok(Json(ProductResponse { ok: true, product }))
}

#[instrument(skip(state, _identity, payload))]
async fn update_product(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::Missing("Id does not exist".into()))?;
    Ok(Json(ProductResponse { ok: true, product }))
}

#[instrument(skip(state, _identity))]
async fn delete_product(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    repo::discontinue(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Missing("Id does not exist".into()))?;
    info!(product_id = %id, "product discontinued");
    Ok(Json(MessageResponse {
        ok: true,
        message: "Product removed".into(),
    }))
}
