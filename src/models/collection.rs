use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Account summary resolved through the owner join, never written by us
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OwnerSummary {
    pub id: String,
    pub student_code: Option<String>,
    pub email: Option<String>,
}

/// A collection as handed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Collection {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub tags: Vec<String>,
    pub refs: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    pub owner: Option<OwnerSummary>,
}

/// A `collections` row as the external store returns it
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub refs: Option<Vec<String>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub owner: Option<OwnerSummary>,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            is_public: row.is_public.unwrap_or(false),
            tags: row.tags.unwrap_or_default(),
            refs: row.refs.unwrap_or_default(),
            created_at: row.created_at,
            owner: row.owner,
        }
    }
}

/// Insert payload; id and created_at are assigned by the store
#[derive(Debug, Clone, Serialize)]
pub struct NewCollection {
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub tags: Vec<String>,
    pub refs: Vec<String>,
}

/// Partial update payload. Absent fields are not serialized, so the store
/// leaves them untouched; `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refs: Option<Vec<String>>,
}

impl CollectionChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.tags.is_none()
            && self.refs.is_none()
    }

    pub fn apply_to(&self, collection: &mut Collection) {
        if let Some(name) = &self.name {
            collection.name = name.clone();
        }
        if let Some(description) = &self.description {
            collection.description = description.clone();
        }
        if let Some(is_public) = self.is_public {
            collection.is_public = is_public;
        }
        if let Some(tags) = &self.tags {
            collection.tags = tags.clone();
        }
        if let Some(refs) = &self.refs {
            collection.refs = refs.clone();
        }
    }
}

/// List scope selected through the `filter` query parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    #[serde(rename = "my")]
    Mine,
    Public,
}

impl Scope {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Scope::All),
            "my" => Some(Scope::Mine),
            "public" => Some(Scope::Public),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Mine => "my",
            Scope::Public => "public",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Filters a caller may put on a list request
#[derive(Debug, Clone, Default)]
pub struct CollectionFilters {
    pub is_public: Option<bool>,
    pub tag: Option<String>,
    pub scope: Scope,
    pub search: Option<String>,
    pub caller_id: Option<String>,
}

/// A list request resolved into store-level constraints, all conjunctive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionQuery {
    pub owner_id: Option<String>,
    pub public_only: bool,
    pub is_public: Option<bool>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl CollectionQuery {
    pub fn matches(&self, collection: &Collection) -> bool {
        if let Some(owner_id) = &self.owner_id {
            if &collection.owner_id != owner_id {
                return false;
            }
        }
        if self.public_only && !collection.is_public {
            return false;
        }
        if let Some(is_public) = self.is_public {
            if collection.is_public != is_public {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !collection.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = collection.name.to_lowercase().contains(&needle);
            let in_description = collection
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }
        true
    }
}

/// Result of a list operation
#[derive(Debug, Clone)]
pub struct CollectionList {
    pub collections: Vec<Collection>,
    pub count: usize,
    pub filter: Scope,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Collection {
        Collection {
            id: "0b6f1f0e-2f59-4a43-9d3b-8f8f5a8e2c11".to_string(),
            owner_id: "alice".to_string(),
            name: "Algorithms".to_string(),
            description: Some("Sorting and Searching notes".to_string()),
            is_public: true,
            tags: vec!["cs".to_string(), "exam".to_string()],
            refs: vec![],
            created_at: OffsetDateTime::UNIX_EPOCH,
            owner: None,
        }
    }

    #[test]
    fn test_row_defaults_nullable_fields() {
        let row: CollectionRow = serde_json::from_value(json!({
            "id": "0b6f1f0e-2f59-4a43-9d3b-8f8f5a8e2c11",
            "owner_id": "alice",
            "name": "Empty",
            "description": null,
            "is_public": null,
            "tags": null,
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        }))
        .unwrap();

        let collection = Collection::from(row);
        assert!(!collection.is_public);
        assert!(collection.tags.is_empty());
        assert!(collection.refs.is_empty());
        assert_eq!(collection.description, None);
        assert_eq!(collection.owner, None);
    }

    #[test]
    fn test_row_keeps_owner_join() {
        let row: CollectionRow = serde_json::from_value(json!({
            "id": "c1",
            "owner_id": "alice",
            "name": "Joined",
            "is_public": true,
            "tags": ["a", "a"],
            "refs": ["r1"],
            "created_at": "2024-05-01T10:00:00Z",
            "owner": { "id": "alice", "student_code": "520H0001", "email": "a@example.com" }
        }))
        .unwrap();

        let collection = Collection::from(row);
        assert_eq!(collection.tags, vec!["a", "a"]);
        assert_eq!(
            collection.owner.unwrap().student_code.as_deref(),
            Some("520H0001")
        );
    }

    #[test]
    fn test_changes_skip_absent_fields() {
        let changes = CollectionChanges {
            description: Some(None),
            is_public: Some(false),
            ..Default::default()
        };
        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(value, json!({ "description": null, "is_public": false }));
        assert!(CollectionChanges::default().is_empty());
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_changes_apply_leaves_untouched_fields() {
        let mut collection = sample();
        CollectionChanges {
            name: Some("Renamed".to_string()),
            ..Default::default()
        }
        .apply_to(&mut collection);

        assert_eq!(collection.name, "Renamed");
        assert_eq!(collection.tags, vec!["cs", "exam"]);
        assert!(collection.is_public);
    }

    #[test]
    fn test_scope_labels() {
        assert_eq!(Scope::parse("my"), Some(Scope::Mine));
        assert_eq!(Scope::parse("mine"), None);
        assert_eq!(Scope::default().label(), "all");
        assert_eq!(serde_json::to_value(Scope::Mine).unwrap(), json!("my"));
    }

    #[test]
    fn test_query_search_is_case_insensitive_over_name_or_description() {
        let collection = sample();
        let by_name = CollectionQuery {
            search: Some("ALGO".to_string()),
            ..Default::default()
        };
        let by_description = CollectionQuery {
            search: Some("searching".to_string()),
            ..Default::default()
        };
        let miss = CollectionQuery {
            search: Some("graphs".to_string()),
            ..Default::default()
        };
        assert!(by_name.matches(&collection));
        assert!(by_description.matches(&collection));
        assert!(!miss.matches(&collection));
    }

    #[test]
    fn test_query_constraints_are_conjunctive() {
        let collection = sample();
        let query = CollectionQuery {
            public_only: true,
            is_public: Some(false),
            ..Default::default()
        };
        assert!(!query.matches(&collection));

        let query = CollectionQuery {
            owner_id: Some("alice".to_string()),
            tag: Some("exam".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&collection));

        let query = CollectionQuery {
            owner_id: Some("alice".to_string()),
            tag: Some("math".to_string()),
            ..Default::default()
        };
        assert!(!query.matches(&collection));
    }
}
