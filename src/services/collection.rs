use crate::error::{AppError, AppResult};
use crate::models::{
    Collection, CollectionChanges, CollectionFilters, CollectionList, CollectionQuery,
    NewCollection, Scope,
};
use crate::repositories::CollectionStore;

/// Caller-supplied fields for a new collection, already validated
#[derive(Debug, Clone, Default)]
pub struct CreateCollection {
    pub name: String,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub refs: Option<Vec<String>>,
}

/// Caller-supplied fields for a partial update, already validated
#[derive(Debug, Clone, Default)]
pub struct UpdateCollection {
    pub name: Option<String>,
    /// `Some(None)` when the caller sent an explicit null
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub refs: Option<Vec<String>>,
}

/// Collection use cases on top of a [`CollectionStore`]
pub struct CollectionService;

impl CollectionService {
    /// List collections matching the filters, newest first
    pub async fn list(
        store: &dyn CollectionStore,
        token: Option<&str>,
        filters: CollectionFilters,
    ) -> AppResult<CollectionList> {
        let query = Self::resolve_query(&filters)?;

        let collections = store
            .list(token, &query)
            .await
            .map_err(|e| e.context("Failed to fetch collections"))?;

        Ok(CollectionList {
            count: collections.len(),
            collections,
            filter: filters.scope,
        })
    }

    /// Fetch one collection; `Ok(None)` when it does not exist
    pub async fn get_by_id(
        store: &dyn CollectionStore,
        token: Option<&str>,
        id: &str,
    ) -> AppResult<Option<Collection>> {
        store
            .find_by_id(token, id)
            .await
            .map_err(|e| e.context("Failed to fetch collection"))
    }

    /// Create a collection owned by the caller
    pub async fn create(
        store: &dyn CollectionStore,
        token: Option<&str>,
        input: CreateCollection,
        caller_id: &str,
    ) -> AppResult<Collection> {
        let new_collection = NewCollection {
            owner_id: caller_id.to_string(),
            name: input.name.trim().to_string(),
            description: normalize_description(input.description),
            is_public: input.is_public.unwrap_or(false),
            tags: input.tags.unwrap_or_default(),
            refs: input.refs.unwrap_or_default(),
        };

        let collection = store
            .insert(token, &new_collection)
            .await
            .map_err(|e| e.context("Failed to create collection"))?;

        tracing::info!(collection_id = %collection.id, owner_id = caller_id, "Collection created");
        Ok(collection)
    }

    /// Apply the supplied fields to a collection the caller owns
    pub async fn update(
        store: &dyn CollectionStore,
        token: Option<&str>,
        id: &str,
        input: UpdateCollection,
        caller_id: &str,
    ) -> AppResult<Collection> {
        let existing = Self::find_owned(store, token, id, caller_id).await?;

        let changes = CollectionChanges {
            name: input.name.map(|name| name.trim().to_string()),
            description: input.description.map(normalize_description),
            is_public: input.is_public,
            tags: input.tags,
            refs: input.refs,
        };
        if changes.is_empty() {
            return Ok(existing);
        }

        // Scoped to the owner too, so a concurrent reassignment or delete
        // between the check and the write surfaces as not found.
        let updated = store
            .update(token, id, caller_id, &changes)
            .await
            .map_err(|e| e.context("Failed to update collection"))?
            .ok_or(AppError::CollectionNotFound)?;

        tracing::info!(collection_id = id, owner_id = caller_id, "Collection updated");
        Ok(updated)
    }

    /// Permanently remove a collection the caller owns
    pub async fn delete(
        store: &dyn CollectionStore,
        token: Option<&str>,
        id: &str,
        caller_id: &str,
    ) -> AppResult<()> {
        Self::find_owned(store, token, id, caller_id).await?;

        let deleted = store
            .delete(token, id, caller_id)
            .await
            .map_err(|e| e.context("Failed to delete collection"))?;
        if !deleted {
            return Err(AppError::CollectionNotFound);
        }

        tracing::info!(collection_id = id, owner_id = caller_id, "Collection deleted");
        Ok(())
    }

    fn resolve_query(filters: &CollectionFilters) -> AppResult<CollectionQuery> {
        let owner_id = match filters.scope {
            Scope::Mine => Some(filters.caller_id.clone().ok_or_else(|| {
                AppError::AuthenticationRequired(
                    "Authentication required to view your collections".to_string(),
                )
            })?),
            Scope::All | Scope::Public => None,
        };

        Ok(CollectionQuery {
            owner_id,
            public_only: filters.scope == Scope::Public,
            is_public: filters.is_public,
            tag: filters.tag.clone(),
            search: filters.search.as_deref().and_then(search_term),
        })
    }

    /// Existence then ownership, in that order
    async fn find_owned(
        store: &dyn CollectionStore,
        token: Option<&str>,
        id: &str,
        caller_id: &str,
    ) -> AppResult<Collection> {
        let existing = store
            .find_by_id(token, id)
            .await
            .map_err(|e| e.context("Failed to check collection existence"))?
            .ok_or(AppError::CollectionNotFound)?;

        if existing.owner_id != caller_id {
            tracing::debug!(collection_id = id, caller_id, "Mutation by non-owner rejected");
            return Err(AppError::Forbidden);
        }

        Ok(existing)
    }
}

/// `*` is a wildcard in the remote `ilike` filter and cannot be escaped there,
/// so it is dropped from the needle for every backend
fn search_term(search: &str) -> Option<String> {
    let term: String = search.chars().filter(|&c| c != '*').collect();
    (!term.is_empty()).then_some(term)
}

/// Trimmed description, or none when blank
fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
