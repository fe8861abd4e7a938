//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries per table)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//! - [`liveness`]: Periodic pool ping
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::db::handlers::{Categories, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Categories::new(&mut conn);
//!
//!     if let Some(category) = repo.get_by_name("Lighting").await? {
//!         println!("Found category {}", category.id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Migrations
//!
//! Migrations live in the `migrations/` directory and are embedded at compile time.
//! [`crate::migrator`] returns the migrator, which is run once at startup.

pub mod errors;
pub mod handlers;
pub mod liveness;
pub mod models;
