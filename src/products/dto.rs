use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Product, ProductWithRefs};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(rename = "unitPrice")]
    pub unit_price: f64,
    pub description: Option<String>,
    pub category: Uuid,
}

/// Partial update; every field optional.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(rename = "unitPrice")]
    pub unit_price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    pub available: Option<bool>,
}

/// Category summary nested in product listings.
#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatorRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ProductOut {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "unitPrice")]
    pub unit_price: f64,
    pub description: Option<String>,
    pub image: Option<String>,
    pub available: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub category: CategoryRef,
    pub user: Option<CreatorRef>,
}

impl From<ProductWithRefs> for ProductOut {
    fn from(row: ProductWithRefs) -> Self {
        let user = match (row.creator_id, row.creator_name, row.creator_email) {
            (Some(id), Some(name), Some(email)) => Some(CreatorRef { id, name, email }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            unit_price: row.unit_price,
            description: row.description,
            image: row.image,
            available: row.available,
            created_at: row.created_at,
            category: CategoryRef {
                id: row.category_id,
                description: row.category_description,
            },
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub ok: bool,
    pub products: Vec<ProductOut>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub ok: bool,
    pub product: ProductOut,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub ok: bool,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_price_uses_the_wire_name() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{ "name": "flat white", "unitPrice": 3.5,
                 "category": "8b7f0f2e-52f9-4bfb-a5a9-1f38b8f7a111" }"#,
        )
        .unwrap();
        assert_eq!(req.unit_price, 3.5);

        let row = ProductWithRefs {
            id: Uuid::new_v4(),
            name: "flat white".into(),
            unit_price: 3.5,
            description: None,
            image: None,
            available: true,
            created_at: OffsetDateTime::now_utc(),
            category_id: Uuid::new_v4(),
            category_description: Some("coffee".into()),
            creator_id: None,
            creator_name: None,
            creator_email: None,
        };
        let json = serde_json::to_value(ProductOut::from(row)).unwrap();
        assert_eq!(json["unitPrice"], 3.5);
        assert!(json.get("unit_price").is_none());
        assert_eq!(json["category"]["description"], "coffee");
    }
}
