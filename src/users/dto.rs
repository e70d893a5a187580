use serde::{Deserialize, Serialize};

use super::repo::{Role, User};

/// Request body for creating a user (admin only).
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Partial update; every field optional.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub role: Option<Role>,
    pub status: Option<bool>,
}

/// `from`/`limit` paging, defaulting to the first five records.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub from: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    5
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub ok: bool,
    pub users: Vec<User>,
    pub size: i64,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub ok: bool,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.from, 0);
        assert_eq!(p.limit, 5);
    }

    #[test]
    fn update_request_accepts_partial_bodies() {
        let u: UpdateUserRequest =
            serde_json::from_str(r#"{ "role": "ADMIN_ROLE", "status": false }"#).unwrap();
        assert_eq!(u.role, Some(Role::Admin));
        assert_eq!(u.status, Some(false));
        assert!(u.name.is_none());
    }
}
