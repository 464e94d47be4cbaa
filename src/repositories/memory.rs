use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Collection, CollectionChanges, CollectionQuery, NewCollection, OwnerSummary};
use crate::repositories::CollectionStore;

/// In-memory collection store for tests and local runs
#[derive(Clone, Default)]
pub struct InMemoryCollectionStore {
    inner: Arc<RwLock<InMemoryStoreInner>>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    /// Insertion order
    rows: Vec<Collection>,
    accounts: HashMap<String, OwnerSummary>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account so the owner join can resolve it
    pub async fn add_account(&self, account: OwnerSummary) {
        let mut inner = self.inner.write().await;
        inner.accounts.insert(account.id.clone(), account);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl InMemoryStoreInner {
    fn joined(&self, collection: &Collection) -> Collection {
        let mut joined = collection.clone();
        joined.owner = self.accounts.get(&collection.owner_id).cloned();
        joined
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn list(
        &self,
        _token: Option<&str>,
        query: &CollectionQuery,
    ) -> AppResult<Vec<Collection>> {
        let inner = self.inner.read().await;

        // Newest insert first among equal timestamps
        let mut matches: Vec<Collection> = inner
            .rows
            .iter()
            .rev()
            .filter(|c| query.matches(c))
            .map(|c| inner.joined(c))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matches)
    }

    async fn find_by_id(&self, _token: Option<&str>, id: &str) -> AppResult<Option<Collection>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .find(|c| c.id == id)
            .map(|c| inner.joined(c)))
    }

    async fn insert(&self, _token: Option<&str>, input: &NewCollection) -> AppResult<Collection> {
        let collection = Collection {
            id: Uuid::new_v4().to_string(),
            owner_id: input.owner_id.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            is_public: input.is_public,
            tags: input.tags.clone(),
            refs: input.refs.clone(),
            created_at: time::OffsetDateTime::now_utc(),
            owner: None,
        };

        let mut inner = self.inner.write().await;
        inner.rows.push(collection.clone());
        Ok(inner.joined(&collection))
    }

    async fn update(
        &self,
        _token: Option<&str>,
        id: &str,
        owner_id: &str,
        changes: &CollectionChanges,
    ) -> AppResult<Option<Collection>> {
        let mut inner = self.inner.write().await;
        let Some(row) = inner
            .rows
            .iter_mut()
            .find(|c| c.id == id && c.owner_id == owner_id)
        else {
            return Ok(None);
        };

        changes.apply_to(row);
        let updated = row.clone();
        Ok(Some(inner.joined(&updated)))
    }

    async fn delete(&self, _token: Option<&str>, id: &str, owner_id: &str) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner
            .rows
            .retain(|c| !(c.id == id && c.owner_id == owner_id));
        Ok(inner.rows.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_collection(owner_id: &str, name: &str, is_public: bool) -> NewCollection {
        NewCollection {
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            description: None,
            is_public,
            tags: vec![],
            refs: vec![],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_joins_owner() {
        let store = InMemoryCollectionStore::new();
        store
            .add_account(OwnerSummary {
                id: "alice".to_string(),
                student_code: Some("520H0001".to_string()),
                email: Some("alice@example.com".to_string()),
            })
            .await;

        let created = store
            .insert(None, &new_collection("alice", "Notes", false))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(created.owner.unwrap().id, "alice");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = InMemoryCollectionStore::new();
        for name in ["first", "second", "third"] {
            store
                .insert(None, &new_collection("alice", name, true))
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list(None, &CollectionQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_mutations_require_matching_owner() {
        let store = InMemoryCollectionStore::new();
        let created = store
            .insert(None, &new_collection("alice", "Notes", false))
            .await
            .unwrap();

        let changes = CollectionChanges {
            is_public: Some(true),
            ..Default::default()
        };
        let updated = store
            .update(None, &created.id, "mallory", &changes)
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.delete(None, &created.id, "mallory").await.unwrap());

        let updated = store
            .update(None, &created.id, "alice", &changes)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_public);
        assert!(store.delete(None, &created.id, "alice").await.unwrap());
        assert!(store.is_empty().await);
    }
}
