//! Database models for products.

use crate::types::{ProductId, SubcategoryId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a new product
#[derive(Debug, Clone)]
pub struct ProductCreateDBRequest {
    pub name: String,
    pub description: String,
    pub subcategory_id: SubcategoryId,
    pub price: Decimal,
    pub current_inventory: i32,
    /// File name under the media root
    pub image: String,
    pub brand: String,
    pub sku: String,
}

pub type ProductUpdateDBRequest = ProductCreateDBRequest;

/// Database response for a product
#[derive(Debug, Clone)]
pub struct ProductDBResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub subcategory_id: SubcategoryId,
    pub price: Decimal,
    pub current_inventory: i32,
    pub image: String,
    pub brand: String,
    pub sku: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
