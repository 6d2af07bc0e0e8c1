//! Typed helpers over `DocumentStore` for model structs.

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::{Collection, DocumentStore};
use crate::error::ApiError;

/// Scopes for fields that must be unique across a collection.
pub mod unique {
    pub const USER_EMAIL: &str = "users.email";
    pub const CATEGORY_TYPE: &str = "menu_categories.type";
}

fn unique_key(scope: &str, value: &str) -> String {
    format!("{scope}:{value}")
}

pub async fn find<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, ApiError> {
    match store.get(collection, id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub async fn find_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
) -> Result<Vec<T>, ApiError> {
    store
        .list(collection)
        .await?
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(ApiError::from))
        .collect()
}

pub async fn insert<T: Serialize>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    record: &T,
) -> Result<(), ApiError> {
    store.insert(collection, id, serde_json::to_value(record)?).await
}

/// Overwrite an existing record. Returns `false` if it no longer exists.
pub async fn save<T: Serialize>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    record: &T,
) -> Result<bool, ApiError> {
    store.replace(collection, id, serde_json::to_value(record)?).await
}

pub async fn upsert<T: Serialize>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    record: &T,
) -> Result<bool, ApiError> {
    store.upsert(collection, id, serde_json::to_value(record)?).await
}

pub async fn remove<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, ApiError> {
    match store.delete(collection, id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

/// Reserve `value` within `scope` for the record `owner_id`.
///
/// Backed by a single `insert`, so of several concurrent claims on the same
/// value exactly one wins. Returns `false` if the value is already held.
pub async fn claim_unique(
    store: &dyn DocumentStore,
    scope: &str,
    value: &str,
    owner_id: &str,
) -> Result<bool, ApiError> {
    let key = unique_key(scope, value);
    let doc = serde_json::json!({ "owner": owner_id });
    match store.insert(Collection::UniqueKeys, &key, doc).await {
        Ok(()) => Ok(true),
        Err(err) if err.status == StatusCode::CONFLICT => Ok(false),
        Err(err) => Err(err),
    }
}

/// Give up a reservation made with [`claim_unique`].
pub async fn release_unique(
    store: &dyn DocumentStore,
    scope: &str,
    value: &str,
) -> Result<(), ApiError> {
    store
        .delete(Collection::UniqueKeys, &unique_key(scope, value))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::store::MemoryStore;

    #[tokio::test]
    async fn claim_is_exclusive_until_released() {
        let store = MemoryStore::new();
        assert!(claim_unique(&store, unique::USER_EMAIL, "a@b.c", "usr_1").await.unwrap());
        assert!(!claim_unique(&store, unique::USER_EMAIL, "a@b.c", "usr_2").await.unwrap());
        assert!(claim_unique(&store, unique::CATEGORY_TYPE, "a@b.c", "cat_1").await.unwrap());

        release_unique(&store, unique::USER_EMAIL, "a@b.c").await.unwrap();
        assert!(claim_unique(&store, unique::USER_EMAIL, "a@b.c", "usr_2").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_have_one_winner() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    claim_unique(store.as_ref(), unique::CATEGORY_TYPE, "tacos", &format!("cat_{i}"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
