//! Type-scoped and system collection stores.
//!
//! [`CollectionStore`] is the CRUD surface over one resolved collection. Two
//! kinds of instantiation exist: per-partition stores bound to an
//! `(applicationId, typeName)` pair, and named system stores for the fixed
//! users collection and the application catalog.

use bson::Document;
use std::sync::Arc;

use crate::{
    backend::StoreBackend,
    config::StoreConfig,
    document::{ensure_id, stamp_created_at, Partition},
    error::StoreResult,
};

/// CRUD over the documents of one collection.
///
/// The store holds no session of its own: every operation acquires its own
/// independent view of the backing connection inside the backend and releases
/// it on exit, so a store value is cheap and safe to construct per request.
#[derive(Debug)]
pub struct CollectionStore<B> {
    backend: Arc<B>,
    collection: String,
}

// Manual impl: a derived Clone would demand `B: Clone`, but only the Arc is
// cloned.
impl<B> Clone for CollectionStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            collection: self.collection.clone(),
        }
    }
}

impl<B: StoreBackend> CollectionStore<B> {
    /// A store bound to the physical partition of one `(application, type)`
    /// pair. The partition is created implicitly on first write; no index is
    /// required on it (documents are schemaless).
    pub fn for_partition(backend: Arc<B>, partition: &Partition) -> Self {
        Self {
            backend,
            collection: partition.collection_name(),
        }
    }

    /// A store over the fixed system users collection. No index.
    pub fn users(backend: Arc<B>, config: &StoreConfig) -> Self {
        Self {
            backend,
            collection: config.users_collection.clone(),
        }
    }

    /// A store over the application catalog collection. Its unique `name`
    /// index is ensured by the backend builder, once per connection.
    pub fn applications(backend: Arc<B>, config: &StoreConfig) -> Self {
        Self {
            backend,
            collection: config.applications_collection.clone(),
        }
    }

    /// Returns the name of the backing collection.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Stamps `createdAt`, assigns `_id` when the caller did not supply one,
    /// and inserts the document. Returns the assigned identifier.
    pub async fn insert(&self, mut document: Document) -> StoreResult<String> {
        let id = ensure_id(&mut document)?;
        stamp_created_at(&mut document);

        self.backend
            .insert_document(&self.collection, document)
            .await?;

        Ok(id)
    }

    /// Returns the sequence of matching documents, all documents when
    /// `filter` is `None`. No implicit limit.
    pub async fn find(
        &self,
        filter: Option<Document>,
        projection: Option<Document>,
    ) -> StoreResult<Vec<Document>> {
        self.backend
            .find_documents(&self.collection, filter, projection)
            .await
    }

    /// Returns the single document with the given identifier, or
    /// [`StoreError::NotFound`](crate::error::StoreError::NotFound).
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Document> {
        self.backend
            .find_document(&self.collection, id)
            .await
    }

    /// Applies a field-level merge to the document with the given
    /// identifier. No document is returned; callers reconstruct the
    /// resulting view from the partial update they supplied.
    pub async fn update_by_id(&self, id: &str, changes: Document) -> StoreResult<()> {
        self.backend
            .update_document(&self.collection, id, changes)
            .await
    }

    /// Deletes the document with the given identifier.
    pub async fn remove_by_id(&self, id: &str) -> StoreResult<()> {
        self.backend
            .remove_document(&self.collection, id)
            .await
    }

    /// Drops the entire backing collection. Dropping an already-nonexistent
    /// collection succeeds.
    pub async fn drop_all(&self) -> StoreResult<()> {
        self.backend
            .drop_collection(&self.collection)
            .await
    }
}
