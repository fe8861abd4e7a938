//! API request/response models for products.

use super::required_name;
use crate::db::models::products::{ProductCreateDBRequest, ProductDBResponse, ProductUpdateDBRequest};
use crate::errors::Error;
use crate::types::{FormValue, ProductId, SubcategoryId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form accepted by `POST /products`.
///
/// Only used to document the request; the handler reads the fields as they stream in.
#[derive(Debug, ToSchema)]
pub struct ProductUpload {
    #[schema(example = "Arm Lamp")]
    pub name: String,
    pub description: String,
    /// Name of an existing subcategory
    #[schema(example = "Desk Lamps")]
    pub subcategory: String,
    #[schema(example = "49.99")]
    pub price: String,
    #[schema(example = "12")]
    pub current_inventory: String,
    pub brand: String,
    pub sku: String,
    /// Image file; its extension is kept when it is jpg, jpeg, png, gif or webp
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Text fields of a product upload, as received.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub subcategory: String,
    pub price: FormValue,
    pub current_inventory: FormValue,
    pub brand: String,
    pub sku: String,
}

impl ProductForm {
    /// Record a multipart text field. Unknown field names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "description" => self.description = value,
            "subcategory" => self.subcategory = value,
            "price" => self.price = FormValue::new(value),
            "current_inventory" => self.current_inventory = FormValue::new(value),
            "brand" => self.brand = value,
            "sku" => self.sku = value,
            _ => tracing::debug!(field, "Ignoring unknown product form field"),
        }
    }
}

/// A validated product upload, waiting for its subcategory id and image name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub subcategory: String,
    pub price: Decimal,
    pub current_inventory: i32,
    pub brand: String,
    pub sku: String,
}

impl TryFrom<ProductForm> for ProductDraft {
    type Error = Error;

    fn try_from(form: ProductForm) -> Result<Self, Self::Error> {
        let subcategory = form.subcategory.trim().to_string();
        if subcategory.is_empty() {
            return Err(Error::BadRequest {
                message: "subcategory must not be empty".to_string(),
            });
        }

        Ok(Self {
            name: required_name(&form.name)?,
            description: form.description.trim().to_string(),
            subcategory,
            price: parse_price(&form.price)?,
            current_inventory: parse_inventory(&form.current_inventory)?,
            brand: form.brand.trim().to_string(),
            sku: form.sku.trim().to_string(),
        })
    }
}

impl ProductDraft {
    pub fn into_db_request(self, subcategory_id: SubcategoryId, image: String) -> ProductCreateDBRequest {
        ProductCreateDBRequest {
            name: self.name,
            description: self.description,
            subcategory_id,
            price: self.price,
            current_inventory: self.current_inventory,
            image,
            brand: self.brand,
            sku: self.sku,
        }
    }
}

/// Request body for replacing a product. Every field is rewritten.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Number or numeric string
    #[schema(value_type = String, example = "3")]
    #[serde(default)]
    pub subcategory_id: FormValue,
    /// Number or numeric string, non-negative
    #[schema(value_type = String, example = "49.99")]
    #[serde(default)]
    pub price: FormValue,
    /// Number or numeric string, non-negative
    #[schema(value_type = String, example = "12")]
    #[serde(default)]
    pub current_inventory: FormValue,
    /// Stored image file name
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub sku: String,
}

impl TryFrom<ProductUpdate> for ProductUpdateDBRequest {
    type Error = Error;

    fn try_from(request: ProductUpdate) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required_name(&request.name)?,
            description: request.description.trim().to_string(),
            subcategory_id: request.subcategory_id.parse("subcategory_id")?,
            price: parse_price(&request.price)?,
            current_inventory: parse_inventory(&request.current_inventory)?,
            image: request.image.trim().to_string(),
            brand: request.brand.trim().to_string(),
            sku: request.sku.trim().to_string(),
        })
    }
}

/// Largest scale the `price NUMERIC(12, 2)` column keeps without rounding
const PRICE_SCALE: u32 = 2;

/// Integer digits the price column holds
const PRICE_INTEGER_DIGITS: u32 = 10;

fn parse_price(value: &FormValue) -> Result<Decimal, Error> {
    let price: Decimal = value.parse("price")?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::BadRequest {
            message: format!("price must not be negative, got {price}"),
        });
    }
    // trailing zeros are harmless: 10.500 is stored as 10.50
    let price = price.normalize();
    if price.scale() > PRICE_SCALE {
        return Err(Error::BadRequest {
            message: format!("price must have at most {PRICE_SCALE} decimal places, got {price}"),
        });
    }
    if price >= Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(Error::BadRequest {
            message: format!("price must be below 10^{PRICE_INTEGER_DIGITS}, got {price}"),
        });
    }
    Ok(price)
}

fn parse_inventory(value: &FormValue) -> Result<i32, Error> {
    let inventory: i32 = value.parse("current_inventory")?;
    if inventory < 0 {
        return Err(Error::BadRequest {
            message: format!("current_inventory must not be negative, got {inventory}"),
        });
    }
    Ok(inventory)
}

/// A stored product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub subcategory_id: SubcategoryId,
    /// Decimal serialized as a string to keep precision
    #[schema(value_type = String, example = "49.99")]
    pub price: Decimal,
    pub current_inventory: i32,
    /// Image file name, served from `/api/images/{image}`
    pub image: String,
    pub brand: String,
    pub sku: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductDBResponse> for ProductResponse {
    fn from(db: ProductDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            subcategory_id: db.subcategory_id,
            price: db.price,
            current_inventory: db.current_inventory,
            image: db.image,
            brand: db.brand,
            sku: db.sku,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
