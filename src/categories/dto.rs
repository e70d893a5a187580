use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Category, CategoryWithCreator};

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub description: String,
}

/// Creator summary nested in listings, mirroring the old
/// `populate('user', 'name email')` shape.
#[derive(Debug, Serialize)]
pub struct CreatorOut {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryOut {
    pub id: Uuid,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: Option<CreatorOut>,
}

impl From<CategoryWithCreator> for CategoryOut {
    fn from(row: CategoryWithCreator) -> Self {
        let user = match (row.creator_id, row.creator_name, row.creator_email) {
            (Some(id), Some(name), Some(email)) => Some(CreatorOut { id, name, email }),
            _ => None,
        };
        Self {
            id: row.id,
            description: row.description,
            created_at: row.created_at,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub ok: bool,
    pub categories: Vec<CategoryOut>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub ok: bool,
    pub category: Category,
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
    fn listing_keeps_creator_when_joined() {
        let row = CategoryWithCreator {
            id: Uuid::new_v4(),
            description: "espresso".into(),
            created_at: OffsetDateTime::now_utc(),
            creator_id: Some(Uuid::new_v4()),
            creator_name: Some("Admin".into()),
            creator_email: Some("admin@cafe.test".into()),
        };
        let out = CategoryOut::from(row);
        let user = out.user.expect("creator present");
        assert_eq!(user.name, "Admin");
    }

    #[test]
    fn listing_tolerates_missing_creator() {
        let row = CategoryWithCreator {
            id: Uuid::new_v4(),
            description: "pastry".into(),
            created_at: OffsetDateTime::now_utc(),
            creator_id: None,
            creator_name: None,
            creator_email: None,
        };
        assert!(CategoryOut::from(row).user.is_none());
    }
}
