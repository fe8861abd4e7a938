//! API request/response models for categories.

use super::required_name;
use crate::db::models::categories::{CategoryCreateDBRequest, CategoryDBResponse};
use crate::errors::Error;
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCreate {
    /// Display name (must be unique and non-blank)
    #[schema(example = "Lighting")]
    #[serde(default)]
    pub name: String,
    #[schema(example = "Lamps, bulbs and fixtures")]
    #[serde(default)]
    pub description: String,
    #[schema(example = "lighting.png")]
    #[serde(default)]
    pub image_url: String,
}

/// Request body for replacing a category. Every field is rewritten.
pub type CategoryUpdate = CategoryCreate;

impl TryFrom<CategoryCreate> for CategoryCreateDBRequest {
    type Error = Error;

    fn try_from(request: CategoryCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required_name(&request.name)?,
            description: request.description.trim().to_string(),
            image_url: request.image_url.trim().to_string(),
        })
    }
}

/// A stored category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryDBResponse> for CategoryResponse {
    fn from(db: CategoryDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            image_url: db.image_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trims_fields() {
        let request = CategoryCreate {
            name: "  Lighting ".to_string(),
            description: " Lamps\n".to_string(),
            image_url: " x.png ".to_string(),
        };
        let db = CategoryCreateDBRequest::try_from(request).unwrap();
        assert_eq!(db.name, "Lighting");
        assert_eq!(db.description, "Lamps");
        assert_eq!(db.image_url, "x.png");
    }

    #[test]
    fn test_blank_name_rejected() {
        let request: CategoryCreate = serde_json::from_str(r#"{"description": "no name"}"#).unwrap();
        let err = CategoryCreateDBRequest::try_from(request).unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }
}
