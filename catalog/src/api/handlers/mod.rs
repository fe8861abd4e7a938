//! HTTP request handlers for all API endpoints.
//!
//! Each handler parses its path and body, runs the work through a repository on a pooled
//! connection, and maps the outcome to a response. Errors are returned as
//! [`crate::errors::Error`], which picks the status code and writes a plain-text body.
//!
//! # Handler Modules
//!
//! - [`categories`]: Category CRUD
//! - [`subcategories`]: Subcategory CRUD and listing by category
//! - [`products`]: Product CRUD with multipart image upload, and listing by category or subcategory
//! - [`images`]: Serving stored product images

pub mod categories;
pub mod images;
pub mod products;
pub mod subcategories;
