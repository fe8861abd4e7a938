//! Database record models.
//!
//! These are the request and response types repositories accept and return. They are kept
//! separate from the API models in [`crate::api::models`], which convert from them.

pub mod categories;
pub mod products;
pub mod subcategories;
