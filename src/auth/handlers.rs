use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::{is_unique_violation, User};

use super::claims::TokenUser;
use super::dto::{AuthResponse, GoogleLoginRequest, LoginRequest};
use super::google::GoogleClaim;
use super::jwt::JwtKeys;
use super::password::verify_password;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/google", post(google_login))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::BadCredentials
        })?;

    // a stored hash that fails to parse (the google-account sentinel)
    // counts as a mismatch, same as the original bcrypt behavior
    let ok = match verify_password(&payload.password, &user.password) {
        Ok(v) => v,
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "stored hash not verifiable");
            false
        }
    };
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::BadCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(TokenUser::from(&user))?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        ok: true,
        user,
        token,
    }))
}

#[instrument(skip(state, payload))]
async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let claim = state
        .google
        .verify(&payload.idtoken)
        .await
        .map_err(|e| ApiError::IdentityVerification(e.to_string()))?;

    let user = reconcile(&state.db, &claim).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(TokenUser::from(&user))?;

    info!(user_id = %user.id, email = %user.email, "user logged in via google");
    Ok(Json(AuthResponse {
        ok: true,
        user,
        token,
    }))
}

/// What to do with an external claim given the existing local record.
#[derive(Debug)]
enum Reconciliation {
    UseExisting(User),
    RejectLocalAccount,
    CreateNew,
}

fn reconcile_action(existing: Option<User>) -> Reconciliation {
    match existing {
        Some(user) if user.google => Reconciliation::UseExisting(user),
        Some(_) => Reconciliation::RejectLocalAccount,
        None => Reconciliation::CreateNew,
    }
}

/// Find-or-create the local user for an external identity claim.
///
/// Two concurrent first logins for the same email can both take the
/// CreateNew path; the loser hits the unique index on email and is
/// resolved by re-reading the winner's row.
async fn reconcile(db: &PgPool, claim: &GoogleClaim) -> Result<User, ApiError> {
    let existing = User::find_by_email(db, &claim.email).await?;
    match reconcile_action(existing) {
        Reconciliation::UseExisting(user) => Ok(user),
        Reconciliation::RejectLocalAccount => {
            warn!(email = %claim.email, "google login against local-credentials account");
            Err(ApiError::LocalAccountOnly)
        }
        Reconciliation::CreateNew => match User::create_google(db, claim).await {
            Ok(user) => {
                info!(user_id = %user.id, email = %user.email, "user created from google claim");
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => {
                let raced = User::find_by_email(db, &claim.email)
                    .await?
                    .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;
                match reconcile_action(Some(raced)) {
                    Reconciliation::UseExisting(user) => Ok(user),
                    _ => Err(ApiError::LocalAccountOnly),
                }
            }
            Err(e) => Err(e.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo::Role;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn stored_user(google: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Existing".into(),
            email: "existing@example.com".into(),
            password: if google {
                crate::auth::password::UNUSABLE_PASSWORD.into()
            } else {
                "$argon2id$fake".into()
            },
            image: None,
            role: Role::User,
            status: true,
            google,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn no_existing_record_means_create() {
        assert!(matches!(reconcile_action(None), Reconciliation::CreateNew));
    }

    #[test]
    fn existing_google_account_is_reused() {
        let user = stored_user(true);
        let email = user.email.clone();
        match reconcile_action(Some(user)) {
            Reconciliation::UseExisting(u) => assert_eq!(u.email, email),
            other => panic!("expected UseExisting, got {other:?}"),
        }
    }

    #[test]
    fn existing_local_account_is_rejected() {
        assert!(matches!(
            reconcile_action(Some(stored_user(false))),
            Reconciliation::RejectLocalAccount
        ));
    }
}
