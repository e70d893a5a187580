use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures surfaced to API callers.
///
/// Every variant renders as a JSON body with `ok: false`; nothing here
/// propagates as a panic. Login failures carry a top-level `message`
/// (the wire contract the admin frontend expects), everything else an
/// `err` object.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid token.")]
    InvalidToken,
    #[error("user or password incorrect.")]
    BadCredentials,
    #[error("user is not Admin")]
    NotAdmin,
    #[error("{0}")]
    IdentityVerification(String),
    #[error("Must be use normal authentication")]
    LocalAccountOnly,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Missing(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "ok": false, "err": { "message": "invalid token." } }),
            ),
            ApiError::BadCredentials => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "message": "user or password incorrect." }),
            ),
            ApiError::NotAdmin => (
                StatusCode::FORBIDDEN,
                json!({ "ok": false, "err": { "message": "user is not Admin" } }),
            ),
            ApiError::IdentityVerification(msg) => (
                StatusCode::FORBIDDEN,
                json!({ "ok": false, "err": { "message": msg } }),
            ),
            ApiError::LocalAccountOnly => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "err": { "message": "Must be use normal authentication" } }),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "err": { "message": msg } }),
            ),
            ApiError::Missing(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "err": { "message": msg } }),
            ),
            ApiError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "err": { "message": "database error" } }),
                )
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "err": { "message": "internal server error" } }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_token_is_401_with_err_object() {
        let (status, body) = body_json(ApiError::InvalidToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], false);
        assert_eq!(body["err"]["message"], "invalid token.");
    }

    #[tokio::test]
    async fn bad_credentials_is_400_with_flat_message() {
        let (status, body) = body_json(ApiError::BadCredentials).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["message"], "user or password incorrect.");
        assert!(body.get("err").is_none());
    }

    #[tokio::test]
    async fn admin_gate_is_403() {
        let (status, body) = body_json(ApiError::NotAdmin).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["err"]["message"], "user is not Admin");
    }

    #[tokio::test]
    async fn google_conflict_keeps_original_message() {
        let (status, body) = body_json(ApiError::LocalAccountOnly).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["err"]["message"], "Must be use normal authentication");
    }

    #[tokio::test]
    async fn database_errors_do_not_leak_details() {
        let (status, body) = body_json(ApiError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["err"]["message"], "database error");
    }
}
