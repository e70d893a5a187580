use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::is_unique_violation;

use super::dto::{
    CategoryBody, CategoryListResponse, CategoryOut, CategoryResponse, MessageResponse,
};
use super::repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/category", get(list_categories).post(create_category))
        .route(
            "/category/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

#[instrument(skip(state, _identity))]
async fn list_categories(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = repo::list_all(&state.db)
        .await?
        .into_iter()
        .map(CategoryOut::from)
        .collect();
    Ok(Json(CategoryListResponse {
        ok: true,
        categories,
    }))
}

#[instrument(skip(state, _identity))]
async fn get_category(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Missing("Category does not exist.".into()))?;
    Ok(Json(CategoryResponse { ok: true, category }))
}

#[instrument(skip(state, identity, payload))]
async fn create_category(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CategoryBody>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = match repo::create(&state.db, &payload.description, identity.id).await {
        Ok(c) => c,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::BadRequest("description must be unique.".into()))
        }
        Err(e) => return Err(e.into()),
    };
    info!(category_id = %category.id, "category created");
    Ok(Json(CategoryResponse { ok: true, category }))
}

#[instrument(skip(state, _identity, payload))]
async fn update_category(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryBody>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = match repo::update_description(&state.db, id, &payload.description).await {
        Ok(Some(c)) => c,
        Ok(None) => return Err(ApiError::Missing("Category does not exist.".into())),
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::BadRequest("description must be unique.".into()))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Json(CategoryResponse { ok: true, category }))
}

#[instrument(skip(state, _admin))]
async fn delete_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !repo::remove(&state.db, id).await? {
        return Err(ApiError::Missing("Id does not exist.".into()));
    }
    info!(category_id = %id, "category removed");
    Ok(Json(MessageResponse {
        ok: true,
        message: "Category removed.".into(),
    }))
}
