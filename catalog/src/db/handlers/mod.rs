//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed `PgConnection`, binds parameters for every statement, and
//! returns the models from [`crate::db::models`].
//!
//! - [`Categories`]
//! - [`Subcategories`]: also lists by parent category
//! - [`Products`]: also lists by subcategory and by category (id or name)

pub mod categories;
pub mod products;
pub mod repository;
pub mod subcategories;

pub use categories::Categories;
pub use products::Products;
pub use repository::Repository;
pub use subcategories::Subcategories;
