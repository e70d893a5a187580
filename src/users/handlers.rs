use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::{AdminUser, AuthUser};
use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{CreateUserRequest, Pagination, UpdateUserRequest, UserListResponse, UserResponse};
use super::repo::{is_unique_violation, Role, User};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users).post(create_user))
        .route(
            "/user/:id",
            axum::routing::put(update_user).delete(delete_user),
        )
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = User::list_active(&state.db, page.from, page.limit).await?;
    let size = User::count_active(&state.db).await?;
    Ok(Json(UserListResponse {
        ok: true,
        users,
        size,
    }))
}

#[instrument(skip(state, payload, _admin))]
async fn create_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("email is not valid.".into()));
    }

    let hash = hash_password(&payload.password)?;
    let role = payload.role.unwrap_or(Role::User);

    let user = match User::create(&state.db, &payload.name, &payload.email, &hash, role).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::BadRequest("email must be unique.".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(Json(UserResponse { ok: true, user }))
}

#[instrument(skip(state, payload, _admin))]
async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if let Some(email) = &payload.email {
        if !is_valid_email(email) {
            return Err(ApiError::BadRequest("email is not valid.".into()));
        }
    }

    let user = match User::update(&state.db, id, &payload).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err(ApiError::Missing("user not found".into())),
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::BadRequest("email must be unique.".into()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(UserResponse { ok: true, user }))
}

#[instrument(skip(state, _admin))]
async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::deactivate(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Missing("user not found".into()))?;
    info!(user_id = %user.id, "user deactivated");
    Ok(Json(UserResponse { ok: true, user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("admin@cafe.test"));
        assert!(is_valid_email("a.b+c@x.co"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email(""));
    }
}
