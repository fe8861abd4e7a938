use crate::api::models::products::{ProductDraft, ProductForm, ProductResponse, ProductUpdate, ProductUpload};
use crate::db::handlers::{Products, Repository, Subcategories};
use crate::db::models::products::ProductUpdateDBRequest;
use crate::errors::{Error, Result};
use crate::media::{generate_name, image_extension};
use crate::types::{Lookup, parse_id};
use crate::AppState;
use crate::api::json::Json;
use axum::{
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};

/// Multipart field carrying the image file
const IMAGE_FIELD: &str = "image";

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    summary = "List products",
    responses(
        (status = 200, description = "All products in creation order", body = Vec<ProductResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Products::new(&mut pool_conn);

    let products = repo.list().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    summary = "Get a product by id or name",
    params(("id" = String, Path, description = "Numeric id, otherwise an exact name")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "No such product"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(product = %product))]
pub async fn get_product(State(state): State<AppState>, Path(product): Path<String>) -> Result<Json<ProductResponse>> {
    let lookup = Lookup::parse(&product);
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Products::new(&mut pool_conn);

    match repo.get(&lookup).await? {
        Some(product) => Ok(Json(ProductResponse::from(product))),
        None => Err(Error::not_found("Product", &lookup)),
    }
}

#[utoipa::path(
    get,
    path = "/products/category/{category}",
    tag = "products",
    summary = "List the products of a category",
    description = "Products in every subcategory of the category. A numeric segment is a category id; \
                   anything else is a category name, and an unknown name is a 404.",
    params(("category" = String, Path, description = "Category id or name")),
    responses(
        (status = 200, description = "Products of the category, possibly empty", body = Vec<ProductResponse>),
        (status = 404, description = "No category with that name"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(category = %category))]
pub async fn list_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ProductResponse>>> {
    let lookup = Lookup::parse(&category);
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Products::new(&mut pool_conn);

    let products = match &lookup {
        Lookup::Id(id) => repo.list_by_category(*id).await?,
        Lookup::Name(name) => repo
            .list_by_category_name(name)
            .await
            .map_err(|e| Error::for_resource(e, "Category", &lookup))?,
    };
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/products/subcategory/{id}",
    tag = "products",
    summary = "List the products of a subcategory",
    params(("id" = i64, Path, description = "Subcategory id")),
    responses(
        (status = 200, description = "Products of the subcategory, possibly empty", body = Vec<ProductResponse>),
        (status = 400, description = "Non-numeric id"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(subcategory_id = %id))]
pub async fn list_products_by_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProductResponse>>> {
    let subcategory_id = parse_id(&id, "subcategory")?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Products::new(&mut pool_conn);

    let products = repo.list_by_subcategory(subcategory_id).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

fn multipart_error(e: MultipartError, limit: usize) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge { limit }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", e.body_text()),
        }
    }
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    summary = "Create a product with its image",
    description = "The subcategory is given by name. The image is stored under a generated name \
                   before the row is inserted, and removed again if the insert fails.",
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid fields, missing image or unknown subcategory"),
        (status = 409, description = "Name already in use"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let limit = state.config.media.max_upload_size;

    let mut form = ProductForm::default();
    let mut image: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| multipart_error(e, limit))? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == IMAGE_FIELD {
            let file_name = field.file_name().map(|s| s.to_string());
            let mut content = Vec::new();

            while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
                if content.len() + chunk.len() > limit {
                    return Err(Error::PayloadTooLarge { limit });
                }
                content.extend_from_slice(&chunk);
            }

            tracing::debug!(file_name = ?file_name, bytes = content.len(), "Received product image");
            image = Some((file_name, content));
        } else {
            let value = field.text().await.map_err(|e| multipart_error(e, limit))?;
            form.set(&field_name, value);
        }
    }

    // Everything is validated before the image touches the disk
    let draft = ProductDraft::try_from(form)?;
    let (file_name, content) = image.ok_or_else(|| Error::BadRequest {
        message: format!("missing '{IMAGE_FIELD}' file"),
    })?;
    if content.is_empty() {
        return Err(Error::BadRequest {
            message: format!("'{IMAGE_FIELD}' file is empty"),
        });
    }

    // Borrowed only for the lookup so no pool slot is held while the image is written
    let subcategory = {
        let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        Subcategories::new(&mut pool_conn)
            .get_by_name(&draft.subcategory)
            .await?
            .ok_or_else(|| Error::BadRequest {
                message: format!("unknown subcategory '{}'", draft.subcategory),
            })?
    };

    let image_name = generate_name(&image_extension(file_name.as_deref()), state.config.media.name_length);
    state.media.store(&image_name, &content).await?;

    let db_request = draft.into_db_request(subcategory.id, image_name.clone());
    let inserted = async {
        let mut pool_conn = state.db.acquire().await?;
        Products::new(&mut pool_conn).create(&db_request).await
    }
    .await;

    match inserted {
        Ok(product) => {
            tracing::info!(product_id = product.id, image = %product.image, "Created product");
            Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
        }
        Err(e) => {
            if let Err(cleanup) = state.media.delete(&image_name).await {
                tracing::warn!(image = %image_name, "Failed to remove image after insert failure: {}", cleanup);
            }
            Err(e.into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    summary = "Replace a product",
    request_body = ProductUpdate,
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid fields or unknown subcategory"),
        (status = 404, description = "No such product"),
        (status = 409, description = "Name already in use"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ProductUpdate>,
) -> Result<Json<ProductResponse>> {
    let id = parse_id(&id, "product")?;
    let db_request = ProductUpdateDBRequest::try_from(request)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Products::new(&mut pool_conn);

    let product = repo
        .update(id, &db_request)
        .await
        .map_err(|e| Error::for_resource(e, "Product", id))?;
    Ok(Json(ProductResponse::from(product)))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    summary = "Delete a product",
    description = "Removes the row only; the stored image is left in place.",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 400, description = "Non-numeric id"),
        (status = 404, description = "No such product"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn delete_product(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&id, "product")?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Products::new(&mut pool_conn);

    if repo.delete(id).await? {
        tracing::info!(product_id = id, "Deleted product");
        Ok(StatusCode::OK)
    } else {
        Err(Error::not_found("Product", id))
    }
}
