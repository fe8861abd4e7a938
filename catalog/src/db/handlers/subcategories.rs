//! Database repository for subcategories.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::subcategories::{SubcategoryCreateDBRequest, SubcategoryDBResponse, SubcategoryUpdateDBRequest},
};
use crate::types::{CategoryId, SubcategoryId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const COLUMNS: &str = "id, name, description, category_id, image_url, created_at, updated_at";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subcategory> for SubcategoryDBResponse {
    fn from(subcategory: Subcategory) -> Self {
        Self {
            id: subcategory.id,
            name: subcategory.name,
            description: subcategory.description,
            category_id: subcategory.category_id,
            image_url: subcategory.image_url,
            created_at: subcategory.created_at,
            updated_at: subcategory.updated_at,
        }
    }
}

pub struct Subcategories<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Subcategories<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Subcategories belonging to one category, in insertion order
    #[instrument(skip(self), err)]
    pub async fn list_by_category(&mut self, category_id: CategoryId) -> Result<Vec<SubcategoryDBResponse>> {
        let subcategories = sqlx::query_as::<_, Subcategory>(&format!(
            "SELECT {COLUMNS} FROM subcategory WHERE category_id = $1 ORDER BY id"
        ))
        .bind(category_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(subcategories.into_iter().map(SubcategoryDBResponse::from).collect())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Subcategories<'c> {
    type CreateRequest = SubcategoryCreateDBRequest;
    type UpdateRequest = SubcategoryUpdateDBRequest;
    type Response = SubcategoryDBResponse;
    type Id = SubcategoryId;

    #[instrument(skip(self, request), fields(name = %request.name, category_id = request.category_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let subcategory = sqlx::query_as::<_, Subcategory>(&format!(
            r#"
            INSERT INTO subcategory (name, description, category_id, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.category_id)
        .bind(&request.image_url)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(SubcategoryDBResponse::from(subcategory))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let subcategory = sqlx::query_as::<_, Subcategory>(&format!("SELECT {COLUMNS} FROM subcategory WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(subcategory.map(SubcategoryDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn get_by_name(&mut self, name: &str) -> Result<Option<Self::Response>> {
        let subcategory = sqlx::query_as::<_, Subcategory>(&format!("SELECT {COLUMNS} FROM subcategory WHERE name = $1"))
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(subcategory.map(SubcategoryDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let subcategories = sqlx::query_as::<_, Subcategory>(&format!("SELECT {COLUMNS} FROM subcategory ORDER BY id"))
            .fetch_all(&mut *self.db)
            .await?;

        Ok(subcategories.into_iter().map(SubcategoryDBResponse::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subcategory WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let subcategory = sqlx::query_as::<_, Subcategory>(&format!(
            r#"
            UPDATE subcategory SET
                name = $2,
                description = $3,
                category_id = $4,
                image_url = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.category_id)
        .bind(&request.image_url)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or_else(|| DbError::NotFound)?;

        Ok(SubcategoryDBResponse::from(subcategory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_category;
    use sqlx::PgPool;

    fn request(name: &str, category_id: CategoryId) -> SubcategoryCreateDBRequest {
        SubcategoryCreateDBRequest {
            name: name.to_string(),
            description: format!("{name} description"),
            category_id,
            image_url: format!("{}.png", name.to_lowercase()),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_then_get(pool: PgPool) {
        let category = create_test_category(&pool, "Lighting").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Subcategories::new(&mut conn);

        let created = repo.create(&request("Desk Lamps", category.id)).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Desk Lamps");
        assert_eq!(fetched.description, "Desk Lamps description");
        assert_eq!(fetched.category_id, category.id);
        assert_eq!(fetched.image_url, "desk lamps.png");

        let by_name = repo.get_by_name("Desk Lamps").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
    }

    #[sqlx::test]
    async fn test_unknown_category_is_foreign_key_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Subcategories::new(&mut conn);

        let result = repo.create(&request("Orphans", 4242)).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn test_list_by_category(pool: PgPool) {
        let lighting = create_test_category(&pool, "Lighting").await;
        let tools = create_test_category(&pool, "Tools").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Subcategories::new(&mut conn);

        repo.create(&request("Desk Lamps", lighting.id)).await.unwrap();
        repo.create(&request("Drills", tools.id)).await.unwrap();
        repo.create(&request("Floor Lamps", lighting.id)).await.unwrap();

        let names: Vec<String> = repo
            .list_by_category(lighting.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Desk Lamps", "Floor Lamps"]);

        assert!(repo.list_by_category(9999).await.unwrap().is_empty());
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }

    #[sqlx::test]
    async fn test_update_moves_category(pool: PgPool) {
        let lighting = create_test_category(&pool, "Lighting").await;
        let tools = create_test_category(&pool, "Tools").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Subcategories::new(&mut conn);

        let created = repo.create(&request("Work Lights", lighting.id)).await.unwrap();
        let updated = repo.update(created.id, &request("Work Lights", tools.id)).await.unwrap();
        assert_eq!(updated.category_id, tools.id);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(matches!(
            repo.update(created.id, &request("Work Lights", tools.id)).await,
            Err(DbError::NotFound)
        ));
    }
}
