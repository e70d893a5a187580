use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{CreateProductRequest, UpdateProductRequest};

/// Product record as stored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "unitPrice")]
    pub unit_price: f64,
    pub description: Option<String>,
    pub image: Option<String>,
    pub available: bool,
    pub category_id: Uuid,
    pub user_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Product joined with its category and creator, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithRefs {
    pub id: Uuid,
    pub name: String,
    pub unit_price: f64,
    pub description: Option<String>,
    pub image: Option<String>,
    pub available: bool,
    pub created_at: OffsetDateTime,
    pub category_id: Uuid,
    pub category_description: Option<String>,
    pub creator_id: Option<Uuid>,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
}

const PRODUCT_COLS: &str =
    "id, name, unit_price, description, image, available, category_id, user_id, created_at";

const JOINED_SELECT: &str = r#"
    SELECT p.id, p.name, p.unit_price, p.description, p.image, p.available, p.created_at,
           p.category_id, c.description AS category_description,
           u.id AS creator_id, u.name AS creator_name, u.email AS creator_email
      FROM products p
      LEFT JOIN categories c ON c.id = p.category_id
      LEFT JOIN users u ON u.id = p.user_id
"#;

pub async fn list_available(
    db: &PgPool,
    from: i64,
    limit: i64,
) -> Result<Vec<ProductWithRefs>, sqlx::Error> {
    sqlx::query_as::<_, ProductWithRefs>(&format!(
        "{JOINED_SELECT} WHERE p.available = TRUE ORDER BY p.created_at LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(from)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<ProductWithRefs>, sqlx::Error> {
    sqlx::query_as::<_, ProductWithRefs>(&format!("{JOINED_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Case-insensitive substring search over available products.
pub async fn search(db: &PgPool, term: &str) -> Result<Vec<ProductWithRefs>, sqlx::Error> {
    sqlx::query_as::<_, ProductWithRefs>(&format!(
        "{JOINED_SELECT}
         WHERE p.available = TRUE AND p.name ILIKE '%' || $1 || '%'
         ORDER BY p.name"
    ))
    .bind(term)
    .fetch_all(db)
    .await
}

pub async fn create(
    db: &PgPool,
    req: &CreateProductRequest,
    user_id: Uuid,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products (name, unit_price, description, category_id, user_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {PRODUCT_COLS}"
    ))
    .bind(&req.name)
    .bind(req.unit_price)
    .bind(&req.description)
    .bind(req.category)
    .bind(user_id)
    .fetch_one(db)
    .await
}

/// Partial update; absent fields keep their stored value.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: &UpdateProductRequest,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET
            name        = COALESCE($2, name),
            unit_price  = COALESCE($3, unit_price),
            description = COALESCE($4, description),
            category_id = COALESCE($5, category_id),
            available   = COALESCE($6, available)
         WHERE id = $1
         RETURNING {PRODUCT_COLS}"
    ))
    .bind(id)
    .bind(&changes.name)
    .bind(changes.unit_price)
    .bind(&changes.description)
    .bind(changes.category)
    .bind(changes.available)
    .fetch_optional(db)
    .await
}

/// Soft delete: the product stops being listed but the record stays.
pub async fn discontinue(db: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET available = FALSE WHERE id = $1 RETURNING {PRODUCT_COLS}"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn set_image(
    db: &PgPool,
    id: Uuid,
    image: &str,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET image = $2 WHERE id = $1 RETURNING {PRODUCT_COLS}"
    ))
    .bind(id)
    .bind(image)
    .fetch_optional(db)
    .await
}
