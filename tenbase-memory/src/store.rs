//! In-memory storage implementation of the store backend.
//!
//! Documents live in nested HashMaps behind an async-aware read-write lock,
//! keyed by collection name and document identifier.

use async_trait::async_trait;
use bson::{Bson, Document};
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};

use tenbase_core::{
    backend::{IndexSpec, StoreBackend, StoreBackendBuilder},
    document::FIELD_ID,
    error::{StoreError, StoreResult},
};

type CollectionMap = HashMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document storage backend.
///
/// `MemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so
/// clones of the same instance share the same underlying data. Filters scan
/// every document of a collection; there is no indexing (`ensure_index` is a
/// no-op). Intended for development and tests.
#[derive(Default, Clone, Debug)]
pub struct MemoryStore {
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing a `MemoryStore`.
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::default()
    }
}

/// True when every field of `filter` is present in `document` with an equal
/// value. Top-level equality only.
fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

/// Applies an inclusion projection: keeps the named fields plus `_id`.
fn project(document: &Document, projection: &Document) -> Document {
    let mut reduced = Document::new();

    for (field, value) in document {
        if field == FIELD_ID || projection.contains_key(field) {
            reduced.insert(field.clone(), value.clone());
        }
    }

    reduced
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn insert_document(&self, collection: &str, document: Document) -> StoreResult<()> {
        let id = document
            .get_str(FIELD_ID)
            .map_err(|err| StoreError::Serialization(err.to_string()))?
            .to_string();

        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        if collection_map.contains_key(&id) {
            return Err(StoreError::Backend(format!(
                "duplicate key {id} in collection {collection}"
            )));
        }

        collection_map.insert(id, document);

        Ok(())
    }

    async fn find_documents(
        &self,
        collection: &str,
        filter: Option<Document>,
        projection: Option<Document>,
    ) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        Ok(collection_map
            .values()
            .filter(|doc| {
                filter
                    .as_ref()
                    .is_none_or(|filter| matches(doc, filter))
            })
            .map(|doc| {
                projection
                    .as_ref()
                    .map_or_else(|| doc.clone(), |projection| project(doc, projection))
            })
            .collect())
    }

    async fn find_document(&self, collection: &str, id: &str) -> StoreResult<Document> {
        let store = self.store.read().await;

        store
            .get(collection)
            .and_then(|col| col.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string(), collection.to_string()))
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let document = store
            .get_mut(collection)
            .and_then(|col| col.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string(), collection.to_string()))?;

        // Field-level merge; fields not named in `changes` stay untouched.
        for (field, value) in changes {
            document.insert(field, value);
        }

        Ok(())
    }

    async fn remove_document(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut store = self.store.write().await;

        store
            .get_mut(collection)
            .and_then(|col| col.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string(), collection.to_string()))
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        // Dropping an absent collection is not an error.
        self.store.write().await.remove(collection);

        Ok(())
    }

    async fn add_to_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Bson,
    ) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        let record = collection_map
            .entry(id.to_string())
            .or_insert_with(|| {
                let mut record = Document::new();
                record.insert(FIELD_ID, id.to_string());
                record
            });

        match record.get_mut(field) {
            Some(Bson::Array(set)) => {
                if !set.contains(&value) {
                    set.push(value);
                }
            }
            _ => {
                record.insert(field, vec![value]);
            }
        }

        Ok(())
    }

    async fn pull_from_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Bson,
    ) -> StoreResult<()> {
        let mut store = self.store.write().await;

        if let Some(record) = store
            .get_mut(collection)
            .and_then(|col| col.get_mut(id))
        {
            if let Some(Bson::Array(set)) = record.get_mut(field) {
                set.retain(|existing| existing != &value);
            }
        }

        Ok(())
    }

    async fn ensure_index(&self, _collection: &str, _spec: &IndexSpec) -> StoreResult<()> {
        // In-memory store does not support indexing (no-op)
        Ok(())
    }
}

/// Builder for constructing [`MemoryStore`] instances.
#[derive(Default)]
pub struct MemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for MemoryStoreBuilder {
    type Backend = MemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn person(id: &str, name: &str) -> Document {
        doc! { "_id": id, "name": name }
    }

    #[tokio::test]
    async fn insert_then_find_returns_document() {
        let store = MemoryStore::new();
        store
            .insert_document("a1.person", person("x1", "Ann"))
            .await
            .unwrap();

        let found = store.find_document("a1.person", "x1").await.unwrap();
        assert_eq!(found.get_str("name").unwrap(), "Ann");
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_backend_error() {
        let store = MemoryStore::new();
        store
            .insert_document("a1.person", person("x1", "Ann"))
            .await
            .unwrap();

        let err = store
            .insert_document("a1.person", person("x1", "Bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn update_merges_fields_without_touching_others() {
        let store = MemoryStore::new();
        store
            .insert_document("a1.person", person("x1", "Ann"))
            .await
            .unwrap();

        store
            .update_document("a1.person", "x1", doc! { "age": 30 })
            .await
            .unwrap();

        let found = store.find_document("a1.person", "x1").await.unwrap();
        assert_eq!(found.get_str("name").unwrap(), "Ann");
        assert_eq!(found.get_i32("age").unwrap(), 30);
    }

    #[tokio::test]
    async fn update_of_missing_document_is_not_found() {
        let store = MemoryStore::new();

        let err = store
            .update_document("a1.person", "nope", doc! { "age": 30 })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(..)));
    }

    #[tokio::test]
    async fn remove_then_find_is_not_found() {
        let store = MemoryStore::new();
        store
            .insert_document("a1.person", person("x1", "Ann"))
            .await
            .unwrap();

        store.remove_document("a1.person", "x1").await.unwrap();

        let err = store.find_document("a1.person", "x1").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(..)));
    }

    #[tokio::test]
    async fn drop_of_absent_collection_succeeds() {
        let store = MemoryStore::new();

        store.drop_collection("a1.ghost").await.unwrap();
        store.drop_collection("a1.ghost").await.unwrap();
    }

    #[tokio::test]
    async fn filter_and_projection_reduce_results() {
        let store = MemoryStore::new();
        store
            .insert_document("a1.person", doc! { "_id": "x1", "name": "Ann", "age": 30 })
            .await
            .unwrap();
        store
            .insert_document("a1.person", doc! { "_id": "x2", "name": "Bob", "age": 40 })
            .await
            .unwrap();

        let found = store
            .find_documents(
                "a1.person",
                Some(doc! { "name": "Ann" }),
                Some(doc! { "age": 1 }),
            )
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_str("_id").unwrap(), "x1");
        assert_eq!(found[0].get_i32("age").unwrap(), 30);
        assert!(found[0].get("name").is_none());
    }

    #[tokio::test]
    async fn add_to_set_is_idempotent_and_upserts_the_record() {
        let store = MemoryStore::new();

        for _ in 0..3 {
            store
                .add_to_set("applications", "a1", "types", Bson::String("person".into()))
                .await
                .unwrap();
        }

        let record = store.find_document("applications", "a1").await.unwrap();
        let types = record.get_array("types").unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].as_str().unwrap(), "person");
    }

    #[tokio::test]
    async fn pull_from_set_tolerates_absent_values() {
        let store = MemoryStore::new();
        store
            .add_to_set("applications", "a1", "types", Bson::String("person".into()))
            .await
            .unwrap();

        store
            .pull_from_set("applications", "a1", "types", Bson::String("person".into()))
            .await
            .unwrap();
        // Pulling again, and from a record that never existed, is a no-op.
        store
            .pull_from_set("applications", "a1", "types", Bson::String("person".into()))
            .await
            .unwrap();
        store
            .pull_from_set("applications", "missing", "types", Bson::String("x".into()))
            .await
            .unwrap();

        let record = store.find_document("applications", "a1").await.unwrap();
        assert!(record.get_array("types").unwrap().is_empty());
    }
}
