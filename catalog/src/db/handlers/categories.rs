//! Database repository for categories.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryUpdateDBRequest},
};
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const COLUMNS: &str = "id, name, description, image_url, created_at, updated_at";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryDBResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            image_url: category.image_url,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

pub struct Categories<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Categories<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Categories<'c> {
    type CreateRequest = CategoryCreateDBRequest;
    type UpdateRequest = CategoryUpdateDBRequest;
    type Response = CategoryDBResponse;
    type Id = CategoryId;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // created_at and updated_at use database DEFAULT NOW()
        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO category (name, description, image_url) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.image_url)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(CategoryDBResponse::from(category))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM category WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(category.map(CategoryDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn get_by_name(&mut self, name: &str) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM category WHERE name = $1"))
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(category.map(CategoryDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let categories = sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM category ORDER BY id"))
            .fetch_all(&mut *self.db)
            .await?;

        Ok(categories.into_iter().map(CategoryDBResponse::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE category SET
                name = $2,
                description = $3,
                image_url = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.image_url)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or_else(|| DbError::NotFound)?;

        Ok(CategoryDBResponse::from(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Subcategories;
    use crate::db::models::subcategories::SubcategoryCreateDBRequest;
    use crate::types::Lookup;
    use sqlx::PgPool;

    fn lighting() -> CategoryCreateDBRequest {
        CategoryCreateDBRequest {
            name: "Lighting".to_string(),
            description: "Lamps and fixtures".to_string(),
            image_url: "lighting.png".to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_then_get(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        let created = repo.create(&lighting()).await.unwrap();
        assert_eq!(created.name, "Lighting");
        assert_eq!(created.created_at, created.updated_at);

        let by_id = repo.get_by_id(created.id).await.unwrap().expect("category should exist");
        assert_eq!(by_id.name, "Lighting");
        assert_eq!(by_id.description, "Lamps and fixtures");
        assert_eq!(by_id.image_url, "lighting.png");

        let by_name = repo.get(&Lookup::Name("Lighting".into())).await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
    }

    #[sqlx::test]
    async fn test_list_empty_and_ordered(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        assert!(repo.list().await.unwrap().is_empty());

        for name in ["Tools", "Cables", "Lighting"] {
            repo.create(&CategoryCreateDBRequest {
                name: name.to_string(),
                ..lighting()
            })
            .await
            .unwrap();
        }

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Tools", "Cables", "Lighting"]);
    }

    #[sqlx::test]
    async fn test_missing_lookups(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        assert!(repo.get_by_id(999).await.unwrap().is_none());
        assert!(repo.get_by_name("Nothing").await.unwrap().is_none());
        assert!(!repo.delete(999).await.unwrap());
        assert!(matches!(repo.update(999, &lighting()).await, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    async fn test_update_replaces_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);
        let created = repo.create(&lighting()).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &CategoryUpdateDBRequest {
                    name: "Outdoor Lighting".to_string(),
                    description: String::new(),
                    image_url: "outdoor.png".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Outdoor Lighting");
        assert_eq!(updated.description, "");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[sqlx::test]
    async fn test_duplicate_name_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);
        repo.create(&lighting()).await.unwrap();

        match repo.create(&lighting()).await {
            Err(DbError::UniqueViolation { conflicting_value, .. }) => {
                assert_eq!(conflicting_value.as_deref(), Some("Lighting"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    async fn test_blank_name_is_check_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        let result = repo
            .create(&CategoryCreateDBRequest {
                name: "   ".to_string(),
                ..lighting()
            })
            .await;
        assert!(matches!(result, Err(DbError::CheckViolation { .. })));
    }

    #[sqlx::test]
    async fn test_delete_with_dependents_is_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let category = Categories::new(&mut conn).create(&lighting()).await.unwrap();
        let subcategory = Subcategories::new(&mut conn)
            .create(&SubcategoryCreateDBRequest {
                name: "Desk Lamps".to_string(),
                description: String::new(),
                category_id: category.id,
                image_url: String::new(),
            })
            .await
            .unwrap();

        let result = Categories::new(&mut conn).delete(category.id).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));

        // dependents remain
        assert!(Categories::new(&mut conn).get_by_id(category.id).await.unwrap().is_some());
        assert!(Subcategories::new(&mut conn).get_by_id(subcategory.id).await.unwrap().is_some());
    }
}
