//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures
//! - **[`json`]**: JSON body extractor that rejects malformed bodies with 400
//!
//! # API Structure
//!
//! Everything is nested under `/api`:
//!
//! - **Categories** (`/api/categories/*`)
//! - **Subcategories** (`/api/subcategories/*`)
//! - **Products** (`/api/products/*`)
//! - **Images** (`/api/images/{name}`)
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. The rendered documentation is
//! available at `/api/docs` when the server is running.

pub mod handlers;
pub mod json;
pub mod models;
