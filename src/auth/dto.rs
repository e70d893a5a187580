use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Request body for local login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for Google sign-in.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub idtoken: String,
}

/// Returned by both login endpoints.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub ok: bool,
    pub user: User,
    pub token: String,
}
