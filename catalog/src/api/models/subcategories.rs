//! API request/response models for subcategories.

use super::required_name;
use crate::db::models::subcategories::{SubcategoryCreateDBRequest, SubcategoryDBResponse};
use crate::errors::Error;
use crate::types::{CategoryId, FormValue, SubcategoryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a subcategory.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubcategoryCreate {
    #[schema(example = "Desk Lamps")]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parent category id, as a number or a numeric string
    #[schema(value_type = String, example = "1")]
    #[serde(default)]
    pub category_id: FormValue,
    #[serde(default)]
    pub image_url: String,
}

/// Request body for replacing a subcategory. Every field is rewritten.
pub type SubcategoryUpdate = SubcategoryCreate;

impl TryFrom<SubcategoryCreate> for SubcategoryCreateDBRequest {
    type Error = Error;

    fn try_from(request: SubcategoryCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required_name(&request.name)?,
            description: request.description.trim().to_string(),
            category_id: request.category_id.parse("category_id")?,
            image_url: request.image_url.trim().to_string(),
        })
    }
}

/// A stored subcategory.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubcategoryResponse {
    pub id: SubcategoryId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubcategoryDBResponse> for SubcategoryResponse {
    fn from(db: SubcategoryDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            category_id: db.category_id,
            image_url: db.image_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
