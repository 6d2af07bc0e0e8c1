use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::ApiError;

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    MenuCategories,
    MenuItems,
    Options,
    Orders,
    Settings,
    /// Reservations for unique fields, keyed `<scope>:<value>`.
    UniqueKeys,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::MenuCategories => "menu_categories",
            Self::MenuItems => "menu_items",
            Self::Options => "options",
            Self::Orders => "orders",
            Self::Settings => "settings",
            Self::UniqueKeys => "unique_keys",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Abstraction over the document store holding catalog, order, user and
/// settings records as JSON documents keyed by ID.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails with `409` if the ID is taken.
    async fn insert(&self, collection: Collection, id: &str, doc: Value) -> Result<(), ApiError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, ApiError>;

    /// All documents in the collection, in ID order.
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, ApiError>;

    /// Insert or overwrite a document. Returns `true` if it already existed.
    async fn upsert(&self, collection: Collection, id: &str, doc: Value) -> Result<bool, ApiError>;

    /// Overwrite an existing document. Returns `false` if there was none.
    async fn replace(&self, collection: Collection, id: &str, doc: Value) -> Result<bool, ApiError>;

    /// Remove a document, returning it if it existed.
    async fn delete(&self, collection: Collection, id: &str) -> Result<Option<Value>, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// DashMap-backed store. One shard entry per collection; documents inside a
/// collection are ordered by ID, which keeps ULID-keyed records in creation
/// order.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<Collection, BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: Collection, id: &str, doc: Value) -> Result<(), ApiError> {
        let mut docs = self.collections.entry(collection).or_default();
        if docs.contains_key(id) {
            return Err(ApiError::conflict(format!(
                "Document {id} already exists in {collection}"
            )));
        }
        docs.insert(id.to_string(), doc);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, ApiError> {
        Ok(self
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>, ApiError> {
        Ok(self
            .collections
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, collection: Collection, id: &str, doc: Value) -> Result<bool, ApiError> {
        let mut docs = self.collections.entry(collection).or_default();
        Ok(docs.insert(id.to_string(), doc).is_some())
    }

    async fn replace(&self, collection: Collection, id: &str, doc: Value) -> Result<bool, ApiError> {
        let Some(mut docs) = self.collections.get_mut(&collection) else {
            return Ok(false);
        };
        match docs.get_mut(id) {
            Some(existing) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<Option<Value>, ApiError> {
        Ok(self
            .collections
            .get_mut(&collection)
            .and_then(|mut docs| docs.remove(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_get_and_list_in_id_order() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Orders, "ord_b", json!({ "id": "ord_b" }))
            .await
            .unwrap();
        store
            .insert(Collection::Orders, "ord_a", json!({ "id": "ord_a" }))
            .await
            .unwrap();

        let doc = store.get(Collection::Orders, "ord_a").await.unwrap();
        assert_eq!(doc, Some(json!({ "id": "ord_a" })));

        let ids: Vec<Value> = store
            .list(Collection::Orders)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("ord_a"), json!("ord_b")]);
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        store.insert(Collection::Users, "usr_1", json!({})).await.unwrap();
        let err = store
            .insert(Collection::Users, "usr_1", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryStore::new();
        store.insert(Collection::Users, "x", json!(1)).await.unwrap();
        assert!(store.get(Collection::Orders, "x").await.unwrap().is_none());
        assert!(store.list(Collection::Options).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_only_touches_existing_documents() {
        let store = MemoryStore::new();
        assert!(!store.replace(Collection::Settings, "main", json!(1)).await.unwrap());

        store.insert(Collection::Settings, "main", json!(1)).await.unwrap();
        assert!(store.replace(Collection::Settings, "main", json!(2)).await.unwrap());
        assert_eq!(
            store.get(Collection::Settings, "main").await.unwrap(),
            Some(json!(2))
        );
    }

    #[tokio::test]
    async fn upsert_reports_previous_existence() {
        let store = MemoryStore::new();
        assert!(!store.upsert(Collection::Settings, "main", json!(1)).await.unwrap());
        assert!(store.upsert(Collection::Settings, "main", json!(2)).await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_removed_document() {
        let store = MemoryStore::new();
        store.insert(Collection::MenuItems, "item_1", json!({ "n": 1 })).await.unwrap();
        assert_eq!(
            store.delete(Collection::MenuItems, "item_1").await.unwrap(),
            Some(json!({ "n": 1 }))
        );
        assert!(store.delete(Collection::MenuItems, "item_1").await.unwrap().is_none());
    }
}
