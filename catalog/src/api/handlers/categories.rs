use crate::api::models::categories::{CategoryCreate, CategoryResponse, CategoryUpdate};
use crate::db::handlers::{Categories, Repository};
use crate::db::models::categories::{CategoryCreateDBRequest, CategoryUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{Lookup, parse_id};
use crate::AppState;
use crate::api::json::Json;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    summary = "List categories",
    responses(
        (status = 200, description = "All categories in creation order", body = Vec<CategoryResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut pool_conn);

    let categories = repo.list().await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Get a category by id or name",
    params(("id" = String, Path, description = "Numeric id, otherwise an exact name")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "No such category"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(category = %category))]
pub async fn get_category(State(state): State<AppState>, Path(category): Path<String>) -> Result<Json<CategoryResponse>> {
    let lookup = Lookup::parse(&category);
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut pool_conn);

    match repo.get(&lookup).await? {
        Some(category) => Ok(Json(CategoryResponse::from(category))),
        None => Err(Error::not_found("Category", &lookup)),
    }
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    summary = "Create a category",
    request_body = CategoryCreate,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Name already in use"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    let db_request = CategoryCreateDBRequest::try_from(request)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut pool_conn);

    let category = repo.create(&db_request).await?;
    tracing::info!(category_id = category.id, name = %category.name, "Created category");
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Replace a category",
    request_body = CategoryUpdate,
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "No such category"),
        (status = 409, description = "Name already in use"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>> {
    let id = parse_id(&id, "category")?;
    let db_request = CategoryUpdateDBRequest::try_from(request)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut pool_conn);

    let category = repo
        .update(id, &db_request)
        .await
        .map_err(|e| Error::for_resource(e, "Category", id))?;
    Ok(Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Delete a category",
    description = "Fails with 400 while subcategories still reference the category.",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 400, description = "Invalid id, or the category is still referenced"),
        (status = 404, description = "No such category"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn delete_category(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&id, "category")?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut pool_conn);

    if repo.delete(id).await? {
        tracing::info!(category_id = id, "Deleted category");
        Ok(StatusCode::OK)
    } else {
        Err(Error::not_found("Category", id))
    }
}
