use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, Path, Query, State},
    http::{header, StatusCode},
    routing::{get, put},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::products;
use crate::state::AppState;
use crate::users::repo::User;

const VALID_KINDS: [&str; 2] = ["users", "products"];
const VALID_EXTENSIONS: [&str; 4] = ["png", "jpg", "gif", "jpeg"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload/:kind/:id", put(upload_image))
        .route("/image/:kind/:image", get(serve_image))
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024))
}

fn extension_of(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Rejects anything that could escape the type-segmented directory.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[instrument(skip(state, mp))]
async fn upload_image(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    mut mp: Multipart,
) -> Result<Json<Value>, ApiError> {
    if !VALID_KINDS.contains(&kind.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Types allowed are {}",
            VALID_KINDS.join(", ")
        )));
    }

    let mut upload: Option<(String, Bytes)> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("No file has been selected".into()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Failed to read file data".into()))?;
        upload = Some((file_name, data));
        break;
    }
    let (file_name, data) =
        upload.ok_or_else(|| ApiError::BadRequest("No file has been selected".into()))?;

    let ext = extension_of(&file_name).unwrap_or_default();
    if !VALID_EXTENSIONS.contains(&ext) {
        return Err(ApiError::BadRequest(format!(
            "Extensions allowed are {}",
            VALID_EXTENSIONS.join(", ")
        )));
    }

    let stored_name = format!("{}-{}.{}", id, Uuid::new_v4(), ext);
    state.images.put(&kind, &stored_name, data).await?;
    info!(%kind, %id, file = %stored_name, "image stored");

    match kind.as_str() {
        "users" => attach_user_image(&state, id, &stored_name).await,
        _ => attach_product_image(&state, id, &stored_name).await,
    }
}

async fn attach_user_image(
    state: &AppState,
    id: Uuid,
    stored_name: &str,
) -> Result<Json<Value>, ApiError> {
    let Some(user) = User::find_by_id(&state.db, id).await? else {
        // orphaned file, remove it again
        state.images.delete("users", stored_name).await?;
        return Err(ApiError::Missing("User not found".into()));
    };
    if let Some(old) = &user.image {
        state.images.delete("users", old).await?;
    }
    let user = User::set_image(&state.db, id, stored_name)
        .await?
        .ok_or_else(|| ApiError::Missing("User not found".into()))?;
    Ok(Json(json!({ "ok": true, "user": user, "img": stored_name })))
}

async fn attach_product_image(
    state: &AppState,
    id: Uuid,
    stored_name: &str,
) -> Result<Json<Value>, ApiError> {
    let Some(product) = products::repo::find_by_id(&state.db, id).await? else {
        state.images.delete("products", stored_name).await?;
        return Err(ApiError::Missing("Product not found".into()));
    };
    if let Some(old) = &product.image {
        state.images.delete("products", old).await?;
    }
    let product = products::repo::set_image(&state.db, id, stored_name)
        .await?
        .ok_or_else(|| ApiError::Missing("Product not found".into()))?;
    Ok(Json(json!({ "ok": true, "product": product, "img": stored_name })))
}

/// Token via query parameter: image tags cannot set headers.
#[derive(Debug, Deserialize)]
struct ImageQuery {
    token: Option<String>,
}

#[instrument(skip(state, query))]
async fn serve_image(
    State(state): State<AppState>,
    Path((kind, image)): Path<(String, String)>,
    Query(query): Query<ImageQuery>,
) -> Result<(StatusCode, [(header::HeaderName, &'static str); 1], Bytes), ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let token = query.token.ok_or(ApiError::InvalidToken)?;
    keys.verify(&token).map_err(|_| {
        warn!("invalid or expired token on image request");
        ApiError::InvalidToken
    })?;

    if !VALID_KINDS.contains(&kind.as_str()) || !is_safe_name(&image) {
        return Err(ApiError::BadRequest("invalid image path".into()));
    }

    if let Some(body) = state.images.get(&kind, &image).await? {
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type_for(&image))],
            body,
        ));
    }

    // fall back to the placeholder shipped with the service
    match tokio::fs::read(&state.config.no_image_path).await {
        Ok(bytes) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/jpeg")],
            Bytes::from(bytes),
        )),
        Err(_) => Err(ApiError::Missing("image not found".into())),
    }
}
