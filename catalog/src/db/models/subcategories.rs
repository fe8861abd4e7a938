//! Database models for subcategories.

use crate::types::{CategoryId, SubcategoryId};
use chrono::{DateTime, Utc};

/// Database request for creating a new subcategory
#[derive(Debug, Clone)]
pub struct SubcategoryCreateDBRequest {
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub image_url: String,
}

pub type SubcategoryUpdateDBRequest = SubcategoryCreateDBRequest;

/// Database response for a subcategory
#[derive(Debug, Clone)]
pub struct SubcategoryDBResponse {
    pub id: SubcategoryId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
