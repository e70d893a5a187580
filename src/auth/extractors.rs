use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::error::ApiError;
use crate::users::repo::Role;

use super::claims::TokenUser;
use super::jwt::JwtKeys;

/// Decoded identity for the current request, extracted from the
/// `Authorization` header. The header carries the bare token; a
/// `Bearer ` prefix is accepted as well.
#[derive(Debug)]
pub struct AuthUser(pub TokenUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidToken)?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header);

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::InvalidToken
        })?;

        Ok(AuthUser(claims.user))
    }
}

/// Decoded identity gated on the admin role.
#[derive(Debug)]
pub struct AdminUser(pub TokenUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, role = ?user.role, "admin route denied");
            return Err(ApiError::NotAdmin);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::{header, Request};
    use uuid::Uuid;

    // JwtKeys is Clone, so it serves as its own state here.
    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            ttl_seconds: 3600,
        })
    }

    fn snapshot(role: Role) -> TokenUser {
        TokenUser {
            id: Uuid::new_v4(),
            name: "Someone".into(),
            email: "someone@cafe.test".into(),
            image: None,
            role,
            status: true,
            google: false,
        }
    }

    fn parts_with_auth(value: Option<&str>) -> axum::http::request::Parts {
        let mut builder = Request::builder().uri("/user");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn bare_token_is_accepted() {
        let keys = keys();
        let token = keys.sign(snapshot(Role::User)).unwrap();
        let mut parts = parts_with_auth(Some(&token));
        let AuthUser(user) = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .expect("extract");
        assert_eq!(user.email, "someone@cafe.test");
    }

    #[tokio::test]
    async fn bearer_prefix_is_accepted() {
        let keys = keys();
        let token = keys.sign(snapshot(Role::User)).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        assert!(AuthUser::from_request_parts(&mut parts, &keys).await.is_ok());
    }

    #[tokio::test]
    async fn missing_header_is_invalid_token() {
        let keys = keys();
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn token_from_another_secret_is_rejected() {
        let other = JwtKeys::new(&JwtConfig {
            secret: "stale-secret".into(),
            ttl_seconds: 3600,
        });
        let token = other.sign(snapshot(Role::Admin)).unwrap();
        let mut parts = parts_with_auth(Some(&token));
        let err = AuthUser::from_request_parts(&mut parts, &keys())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn admin_gate_allows_admin_only() {
        let keys = keys();

        let token = keys.sign(snapshot(Role::Admin)).unwrap();
        let mut parts = parts_with_auth(Some(&token));
        assert!(AdminUser::from_request_parts(&mut parts, &keys).await.is_ok());

        let token = keys.sign(snapshot(Role::User)).unwrap();
        let mut parts = parts_with_auth(Some(&token));
        let err = AdminUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAdmin));
    }
}
