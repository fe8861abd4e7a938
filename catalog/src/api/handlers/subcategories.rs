use crate::api::models::subcategories::{SubcategoryCreate, SubcategoryResponse, SubcategoryUpdate};
use crate::db::handlers::{Repository, Subcategories};
use crate::db::models::subcategories::{SubcategoryCreateDBRequest, SubcategoryUpdateDBRequest};
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
    path = "/subcategories",
    tag = "subcategories",
    summary = "List subcategories",
    responses(
        (status = 200, description = "All subcategories in creation order", body = Vec<SubcategoryResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_subcategories(State(state): State<AppState>) -> Result<Json<Vec<SubcategoryResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Subcategories::new(&mut pool_conn);

    let subcategories = repo.list().await?;
    Ok(Json(subcategories.into_iter().map(SubcategoryResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/subcategories/{id}",
    tag = "subcategories",
    summary = "Get a subcategory by id or name",
    params(("id" = String, Path, description = "Numeric id, otherwise an exact name")),
    responses(
        (status = 200, description = "Subcategory found", body = SubcategoryResponse),
        (status = 404, description = "No such subcategory"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(subcategory = %subcategory))]
pub async fn get_subcategory(
    State(state): State<AppState>,
    Path(subcategory): Path<String>,
) -> Result<Json<SubcategoryResponse>> {
    let lookup = Lookup::parse(&subcategory);
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Subcategories::new(&mut pool_conn);

    match repo.get(&lookup).await? {
        Some(subcategory) => Ok(Json(SubcategoryResponse::from(subcategory))),
        None => Err(Error::not_found("Subcategory", &lookup)),
    }
}

#[utoipa::path(
    get,
    path = "/subcategories/category/{id}",
    tag = "subcategories",
    summary = "List the subcategories of a category",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Subcategories of the category, possibly empty", body = Vec<SubcategoryResponse>),
        (status = 400, description = "Non-numeric id"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(category_id = %id))]
pub async fn list_subcategories_by_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SubcategoryResponse>>> {
    let category_id = parse_id(&id, "category")?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Subcategories::new(&mut pool_conn);

    let subcategories = repo.list_by_category(category_id).await?;
    Ok(Json(subcategories.into_iter().map(SubcategoryResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/subcategories",
    tag = "subcategories",
    summary = "Create a subcategory",
    request_body = SubcategoryCreate,
    responses(
        (status = 201, description = "Subcategory created", body = SubcategoryResponse),
        (status = 400, description = "Invalid request or unknown category"),
        (status = 409, description = "Name already in use"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_subcategory(
    State(state): State<AppState>,
    Json(request): Json<SubcategoryCreate>,
) -> Result<(StatusCode, Json<SubcategoryResponse>)> {
    let db_request = SubcategoryCreateDBRequest::try_from(request)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Subcategories::new(&mut pool_conn);

    let subcategory = repo.create(&db_request).await?;
    tracing::info!(subcategory_id = subcategory.id, name = %subcategory.name, "Created subcategory");
    Ok((StatusCode::CREATED, Json(SubcategoryResponse::from(subcategory))))
}

#[utoipa::path(
    put,
    path = "/subcategories/{id}",
    tag = "subcategories",
    summary = "Replace a subcategory",
    request_body = SubcategoryUpdate,
    params(("id" = i64, Path, description = "Subcategory id")),
    responses(
        (status = 200, description = "Subcategory updated", body = SubcategoryResponse),
        (status = 400, description = "Invalid request or unknown category"),
        (status = 404, description = "No such subcategory"),
        (status = 409, description = "Name already in use"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SubcategoryUpdate>,
) -> Result<Json<SubcategoryResponse>> {
    let id = parse_id(&id, "subcategory")?;
    let db_request = SubcategoryUpdateDBRequest::try_from(request)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Subcategories::new(&mut pool_conn);

    let subcategory = repo
        .update(id, &db_request)
        .await
        .map_err(|e| Error::for_resource(e, "Subcategory", id))?;
    Ok(Json(SubcategoryResponse::from(subcategory)))
}

#[utoipa::path(
    delete,
    path = "/subcategories/{id}",
    tag = "subcategories",
    summary = "Delete a subcategory",
    description = "Fails with 400 while products still reference the subcategory.",
    params(("id" = i64, Path, description = "Subcategory id")),
    responses(
        (status = 200, description = "Subcategory deleted"),
        (status = 400, description = "Invalid id, or the subcategory is still referenced"),
        (status = 404, description = "No such subcategory"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn delete_subcategory(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&id, "subcategory")?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Subcategories::new(&mut pool_conn);

    if repo.delete(id).await? {
        tracing::info!(subcategory_id = id, "Deleted subcategory");
        Ok(StatusCode::OK)
    } else {
        Err(Error::not_found("Subcategory", id))
    }
}
