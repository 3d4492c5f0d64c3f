//! Storage backend abstraction for the type-scoped store.
//!
//! The [`StoreBackend`] trait provides a unified async interface over the
//! physical store: single-document CRUD, idempotent partition drops, set
//! updates against catalog records, and one-time index bootstrap.
//! Implementations are required to be thread-safe (`Send + Sync`) and support
//! concurrent access; every call is independently atomic at the
//! single-document level only. No cross-document or cross-collection
//! transaction is provided.

use async_trait::async_trait;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::StoreResult;

/// Index requirements for a collection, ensured at most once per backing
/// connection before the first operation on the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// The field to index.
    pub field: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Whether documents missing the field are excluded from the index.
    pub sparse: bool,
    /// Whether the backend may build the index in the background.
    pub background: bool,
}

impl IndexSpec {
    /// A unique, non-sparse, background-built index over `field`.
    pub fn unique_on(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            unique: true,
            sparse: false,
            background: true,
        }
    }
}

/// Abstract interface for the physical document store.
///
/// Implementers provide concrete storage strategies: the in-memory backend is
/// used for development and tests, the MongoDB backend for persistent
/// deployments. All methods operate on one named collection; the caller is
/// responsible for resolving a partition to its collection name.
///
/// # Error Handling
///
/// Operations return [`StoreResult<T>`](crate::error::StoreResult). Lookups,
/// updates, and removals of a missing document yield
/// [`StoreError::NotFound`](crate::error::StoreError::NotFound); any other
/// backend failure yields [`StoreError::Backend`](crate::error::StoreError::Backend).
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts one document into a collection. The collection is created
    /// implicitly if it does not exist. The document already carries its
    /// `_id`; inserting a duplicate identifier is a backend error.
    async fn insert_document(&self, collection: &str, document: Document) -> StoreResult<()>;

    /// Returns the sequence of documents matching `filter` (all documents
    /// when `None`), optionally reduced to the fields named by `projection`.
    /// No implicit limit is applied.
    async fn find_documents(
        &self,
        collection: &str,
        filter: Option<Document>,
        projection: Option<Document>,
    ) -> StoreResult<Vec<Document>>;

    /// Returns the single document with the given identifier.
    async fn find_document(&self, collection: &str, id: &str) -> StoreResult<Document>;

    /// Applies a field-level merge of `changes` to the document with the
    /// given identifier. Fields not named in `changes` are left untouched.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> StoreResult<()>;

    /// Deletes the document with the given identifier.
    async fn remove_document(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Drops an entire collection. Idempotent: dropping a collection that
    /// does not exist is NOT an error and must be swallowed by the
    /// implementation, matched on the backend's structured
    /// "namespace does not exist" condition.
    async fn drop_collection(&self, collection: &str) -> StoreResult<()>;

    /// Adds `value` to the array field of the record with the given
    /// identifier, with set semantics: duplicates are no-ops. The record is
    /// created when absent.
    async fn add_to_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Bson,
    ) -> StoreResult<()>;

    /// Removes `value` from the array field of the record with the given
    /// identifier. Removing an absent value (or from an absent record) is a
    /// no-op.
    async fn pull_from_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Bson,
    ) -> StoreResult<()>;

    /// Ensures the index described by `spec` exists on the collection.
    /// Implementations guarantee the index is created at most once per
    /// backing connection; bootstrap failure is fatal
    /// ([`StoreError::Config`](crate::error::StoreError::Config)).
    async fn ensure_index(&self, collection: &str, spec: &IndexSpec) -> StoreResult<()>;

    /// Cleanly shuts down the backend, releasing held resources. The default
    /// implementation is a no-op.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
