//! OpenAPI documentation for the catalog API at `/api/*`.
//!
//! The document is served as JSON at `/api/openapi.json` and rendered with Scalar at `/api/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api", description = "Catalog API")
    ),
    paths(
        api::handlers::categories::list_categories,
        api::handlers::categories::get_category,
        api::handlers::categories::create_category,
        api::handlers::categories::update_category,
        api::handlers::categories::delete_category,
        api::handlers::subcategories::list_subcategories,
        api::handlers::subcategories::get_subcategory,
        api::handlers::subcategories::list_subcategories_by_category,
        api::handlers::subcategories::create_subcategory,
        api::handlers::subcategories::update_subcategory,
        api::handlers::subcategories::delete_subcategory,
        api::handlers::products::list_products,
        api::handlers::products::get_product,
        api::handlers::products::list_products_by_category,
        api::handlers::products::list_products_by_subcategory,
        api::handlers::products::create_product,
        api::handlers::products::update_product,
        api::handlers::products::delete_product,
        api::handlers::images::get_image,
    ),
    components(
        schemas(
            api::models::categories::CategoryCreate,
            api::models::categories::CategoryResponse,
            api::models::subcategories::SubcategoryCreate,
            api::models::subcategories::SubcategoryResponse,
            api::models::products::ProductUpload,
            api::models::products::ProductUpdate,
            api::models::products::ProductResponse,
        )
    ),
    tags(
        (name = "categories", description = "Top level of the catalog. A category cannot be deleted while subcategories reference it."),
        (name = "subcategories", description = "Second level, each belonging to one category. A subcategory cannot be deleted while products reference it."),
        (name = "products", description = "Sellable items, each belonging to one subcategory and carrying one stored image.

Products are created with a `multipart/form-data` upload that names the subcategory; updates are plain JSON."),
        (name = "images", description = "Product images stored by the service."),
    ),
    info(
        title = "Catalog API",
        version = "1.0.0",
        description = "Three-level product catalog: categories, subcategories and products.

## Lookups

`GET` routes for a single item accept either a numeric id or an exact name in the path.
Mutating routes take the numeric id only.

## Errors

Errors are returned as a plain-text body with the status code:

- `400` for invalid input, unknown references, and deletes blocked by dependents
- `404` for missing items
- `409` for duplicate names
- `413` for uploads over the configured limit"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/categories",
            "/categories/{id}",
            "/subcategories/category/{id}",
            "/products/category/{category}",
            "/products/subcategory/{id}",
            "/images/{name}",
        ] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }
}
