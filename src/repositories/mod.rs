pub mod memory;
pub mod supabase;

pub use memory::InMemoryCollectionStore;
pub use supabase::SupabaseCollectionStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Collection, CollectionChanges, CollectionQuery, NewCollection};

/// Storage port for the `collections` relation.
///
/// Every call carries the caller's bearer token so the store evaluates its
/// row-level policies as that identity. `None` means an anonymous call.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Rows matching the query, newest first, with the owner joined
    async fn list(&self, token: Option<&str>, query: &CollectionQuery)
        -> AppResult<Vec<Collection>>;

    /// Exact match on id; `Ok(None)` when no row matches
    async fn find_by_id(&self, token: Option<&str>, id: &str) -> AppResult<Option<Collection>>;

    /// Persist a new row and return it as stored
    async fn insert(&self, token: Option<&str>, input: &NewCollection) -> AppResult<Collection>;

    /// Patch the row matching both `id` and `owner_id`; `Ok(None)` if none did
    async fn update(
        &self,
        token: Option<&str>,
        id: &str,
        owner_id: &str,
        changes: &CollectionChanges,
    ) -> AppResult<Option<Collection>>;

    /// Remove the row matching both `id` and `owner_id`; `false` if none did
    async fn delete(&self, token: Option<&str>, id: &str, owner_id: &str) -> AppResult<bool>;
}
