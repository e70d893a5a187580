use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Category record as stored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub description: String,
    pub user_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Category joined with its creator, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryWithCreator {
    pub id: Uuid,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub creator_id: Option<Uuid>,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
}

const CATEGORY_COLS: &str = "id, description, user_id, created_at";

pub async fn list_all(db: &PgPool) -> Result<Vec<CategoryWithCreator>, sqlx::Error> {
    sqlx::query_as::<_, CategoryWithCreator>(
        r#"
        SELECT c.id, c.description, c.created_at,
               u.id AS creator_id, u.name AS creator_name, u.email AS creator_email
          FROM categories c
          LEFT JOIN users u ON u.id = c.user_id
         ORDER BY c.description
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLS} FROM categories WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(
    db: &PgPool,
    description: &str,
    user_id: Uuid,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (description, user_id)
         VALUES ($1, $2)
         RETURNING {CATEGORY_COLS}"
    ))
    .bind(description)
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn update_description(
    db: &PgPool,
    id: Uuid,
    description: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET description = $2 WHERE id = $1 RETURNING {CATEGORY_COLS}"
    ))
    .bind(id)
    .bind(description)
    .fetch_optional(db)
    .await
}

/// Hard delete; categories are the one resource actually removed.
pub async fn remove(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
