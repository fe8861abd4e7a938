//! Database models for categories.

use crate::types::CategoryId;
use chrono::{DateTime, Utc};

/// Database request for creating a new category
#[derive(Debug, Clone)]
pub struct CategoryCreateDBRequest {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

/// Updates replace every column, so they carry the same fields as a create.
pub type CategoryUpdateDBRequest = CategoryCreateDBRequest;

/// Database response for a category
#[derive(Debug, Clone)]
pub struct CategoryDBResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
