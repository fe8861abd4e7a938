//! Database repository for products.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::products::{ProductCreateDBRequest, ProductDBResponse, ProductUpdateDBRequest},
};
use crate::types::{CategoryId, ProductId, SubcategoryId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const COLUMNS: &str = "id, name, description, subcategory_id, price, current_inventory, image, brand, sku, created_at, updated_at";

/// Same columns qualified with the `p` alias, for joins
const JOINED_COLUMNS: &str = "p.id, p.name, p.description, p.subcategory_id, p.price, p.current_inventory, p.image, p.brand, p.sku, p.created_at, p.updated_at";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Product {
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

impl From<Product> for ProductDBResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            subcategory_id: product.subcategory_id,
            price: product.price,
            current_inventory: product.current_inventory,
            image: product.image,
            brand: product.brand,
            sku: product.sku,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

pub struct Products<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Products<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn list_by_subcategory(&mut self, subcategory_id: SubcategoryId) -> Result<Vec<ProductDBResponse>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM product WHERE subcategory_id = $1 ORDER BY id"
        ))
        .bind(subcategory_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(products.into_iter().map(ProductDBResponse::from).collect())
    }

    /// Products in any subcategory of the given category
    #[instrument(skip(self), err)]
    pub async fn list_by_category(&mut self, category_id: CategoryId) -> Result<Vec<ProductDBResponse>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM product p
            JOIN subcategory s ON s.id = p.subcategory_id
            WHERE s.category_id = $1
            ORDER BY p.id
            "#
        ))
        .bind(category_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(products.into_iter().map(ProductDBResponse::from).collect())
    }

    /// Like [`Self::list_by_category`], addressing the category by name.
    ///
    /// An unknown category is `NotFound`, unlike a known category without products.
    #[instrument(skip(self), err)]
    pub async fn list_by_category_name(&mut self, category_name: &str) -> Result<Vec<ProductDBResponse>> {
        let category_id: CategoryId = sqlx::query_scalar("SELECT id FROM category WHERE name = $1")
            .bind(category_name)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        self.list_by_category(category_id).await
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Products<'c> {
    type CreateRequest = ProductCreateDBRequest;
    type UpdateRequest = ProductUpdateDBRequest;
    type Response = ProductDBResponse;
    type Id = ProductId;

    #[instrument(skip(self, request), fields(name = %request.name, subcategory_id = request.subcategory_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO product (name, description, subcategory_id, price, current_inventory, image, brand, sku)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.subcategory_id)
        .bind(request.price)
        .bind(request.current_inventory)
        .bind(&request.image)
        .bind(&request.brand)
        .bind(&request.sku)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ProductDBResponse::from(product))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let product = sqlx::query_as::<_, Product>(&format!("SELECT {COLUMNS} FROM product WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(product.map(ProductDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn get_by_name(&mut self, name: &str) -> Result<Option<Self::Response>> {
        let product = sqlx::query_as::<_, Product>(&format!("SELECT {COLUMNS} FROM product WHERE name = $1"))
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(product.map(ProductDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let products = sqlx::query_as::<_, Product>(&format!("SELECT {COLUMNS} FROM product ORDER BY id"))
            .fetch_all(&mut *self.db)
            .await?;

        Ok(products.into_iter().map(ProductDBResponse::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE product SET
                name = $2,
                description = $3,
                subcategory_id = $4,
                price = $5,
                current_inventory = $6,
                image = $7,
                brand = $8,
                sku = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.subcategory_id)
        .bind(request.price)
        .bind(request.current_inventory)
        .bind(&request.image)
        .bind(&request.brand)
        .bind(&request.sku)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or_else(|| DbError::NotFound)?;

        Ok(ProductDBResponse::from(product))
    }
}
