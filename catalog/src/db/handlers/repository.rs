//! Base repository trait for database operations.

use crate::db::errors::Result;
use crate::types::Lookup;

/// Base repository trait providing common database operations
///
/// A repository is the data access layer for one postgres table. It wraps a borrowed connection,
/// so a handler acquires a connection from the pool, builds the repository, and the connection
/// goes back to the pool when it is dropped.
///
/// Updates are full replacements: the update request carries every mutable column.
#[async_trait::async_trait]
pub trait Repository: Send {
    /// The request type for creating entities
    type CreateRequest: Sync;

    /// The request type for updating entities
    type UpdateRequest: Sync;

    /// The response/DTO type returned by operations
    type Response: Send;

    /// The identifier type for lookups
    type Id: Send + Sync + Copy;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Get an entity by its unique name (exact match)
    async fn get_by_name(&mut self, name: &str) -> Result<Option<Self::Response>>;

    /// List every entity in insertion order
    async fn list(&mut self) -> Result<Vec<Self::Response>>;

    /// Delete an entity by ID, returning whether a row was removed
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Update an entity by ID. Fails with `NotFound` if no row has that id.
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;

    /// Resolve a path lookup to a single entity
    async fn get(&mut self, lookup: &Lookup) -> Result<Option<Self::Response>>
    where
        Self::Id: From<i64>,
    {
        match lookup {
            Lookup::Id(id) => self.get_by_id(Self::Id::from(*id)).await,
            Lookup::Name(name) => self.get_by_name(name).await,
        }
    }
}
