use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::google::GoogleClaim;
use crate::auth::password::UNUSABLE_PASSWORD;

use super::dto::UpdateUserRequest;

/// Account role. Admins may manage users and delete categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    #[serde(rename = "ADMIN_ROLE")]
    #[sqlx(rename = "ADMIN_ROLE")]
    Admin,
    #[serde(rename = "USER_ROLE")]
    #[sqlx(rename = "USER_ROLE")]
    User,
}

/// User record. The password column holds an argon2 hash, or the
/// unusable sentinel for accounts created through Google sign-in; it
/// is never serialized into a response.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub image: Option<String>,
    pub role: Role,
    pub status: bool,
    pub google: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const USER_COLS: &str = "id, name, email, password, image, role, status, google, created_at";

/// True when the error is a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Page of active (not soft-deleted) users.
    pub async fn list_active(db: &PgPool, from: i64, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLS} FROM users WHERE status = TRUE
             ORDER BY created_at LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(from)
        .fetch_all(db)
        .await
    }

    pub async fn count_active(db: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE status = TRUE")
            .fetch_one(db)
            .await
    }

    /// Create a local-credentials user. `password` must already be hashed.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password, role)
             VALUES ($1, $2, $3, $4::user_role)
             RETURNING {USER_COLS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password)
        .bind(role)
        .fetch_one(db)
        .await
    }

    /// Create an account for a first-time Google sign-in. The password is
    /// the unusable sentinel, so local login can never succeed for it.
    pub async fn create_google(db: &PgPool, claim: &GoogleClaim) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password, image, google)
             VALUES ($1, $2, $3, $4, TRUE)
             RETURNING {USER_COLS}"
        ))
        .bind(&claim.name)
        .bind(&claim.email)
        .bind(UNUSABLE_PASSWORD)
        .bind(&claim.picture)
        .fetch_one(db)
        .await
    }

    /// Partial update; absent fields keep their stored value.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        changes: &UpdateUserRequest,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                name   = COALESCE($2, name),
                email  = COALESCE($3, email),
                image  = COALESCE($4, image),
                role   = COALESCE($5::user_role, role),
                status = COALESCE($6, status)
             WHERE id = $1
             RETURNING {USER_COLS}"
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.image)
        .bind(changes.role)
        .bind(changes.status)
        .fetch_optional(db)
        .await
    }

    /// Soft delete: flips status to false, the record stays.
    pub async fn deactivate(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET status = FALSE WHERE id = $1 RETURNING {USER_COLS}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn set_image(
        db: &PgPool,
        id: Uuid,
        image: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET image = $2 WHERE id = $1 RETURNING {USER_COLS}"
        ))
        .bind(id)
        .bind(image)
        .fetch_optional(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role, google: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Sample".into(),
            email: "sample@example.com".into(),
            password: "$argon2id$fake".into(),
            image: None,
            role,
            status: true,
            google,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn role_serializes_to_wire_values() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN_ROLE\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER_ROLE\"");
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert!(serde_json::from_str::<Role>("\"ROOT_ROLE\"").is_err());
    }

    #[test]
    fn user_serialization_never_exposes_password() {
        let user = sample_user(Role::User, false);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "sample@example.com");
        assert_eq!(json["role"], "USER_ROLE");
        assert_eq!(json["status"], true);
    }
}
