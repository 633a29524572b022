//! Base repository trait for database operations.

use crate::db::errors::Result;
use std::collections::HashMap;

/// Common operations over one postgres table.
///
/// Repositories create and read entities and list them with simple filters. Rows are never
/// updated or deleted through a repository. Each repository borrows a connection for its
/// lifetime, so it sees whatever transaction that connection is in.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The response type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Insert a new entity and return it with its generated fields filled in
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Get lots of entities by their IDs, keyed by ID. Unknown IDs are skipped.
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>>;

    /// List entities with filtering and pagination
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;
}
