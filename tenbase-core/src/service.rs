//! Orchestration of type-scoped CRUD with registry bookkeeping and change
//! notifications.
//!
//! [`TypeService`] is the inbound surface for request handlers: each mutation
//! fires a detached type registration, performs the synchronous storage call,
//! then builds and dispatches exactly one change message after the storage
//! operation has committed, returning to the caller without waiting on
//! delivery. Reads also register the type but never notify.

use bson::Document;
use std::sync::Arc;

use crate::{
    backend::StoreBackend,
    config::StoreConfig,
    document::{Partition, FIELD_ID},
    error::StoreResult,
    message::{MessageBuilder, Operation},
    notify::{NotificationTransport, Notifier},
    registry::TypeRegistry,
    store::CollectionStore,
};

/// Per-request context supplied by the (external) authentication layer.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The actor's API token, embedded into every change message.
    pub token: String,
    /// Request options forwarded opaquely to consumers.
    pub options: Document,
}

impl RequestContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            options: Document::new(),
        }
    }

    pub fn with_options(mut self, options: Document) -> Self {
        self.options = options;
        self
    }
}

/// Type-scoped CRUD plus change-notification dispatch.
#[derive(Debug)]
pub struct TypeService<B> {
    backend: Arc<B>,
    registry: TypeRegistry<B>,
    notifier: Notifier,
    builder: MessageBuilder,
}

impl<B> Clone for TypeService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            registry: self.registry.clone(),
            notifier: self.notifier.clone(),
            builder: self.builder.clone(),
        }
    }
}

impl<B: StoreBackend + 'static> TypeService<B> {
    /// Wires a service over the given backend and transport, tagging
    /// messages with the API origin.
    pub fn new(
        backend: Arc<B>,
        config: &StoreConfig,
        transport: Arc<dyn NotificationTransport>,
    ) -> Self {
        Self {
            registry: TypeRegistry::new(Arc::clone(&backend), config),
            notifier: Notifier::new(transport),
            builder: MessageBuilder::api(),
            backend,
        }
    }

    /// The registry this service feeds.
    pub fn registry(&self) -> &TypeRegistry<B> {
        &self.registry
    }

    fn store(&self, partition: &Partition) -> CollectionStore<B> {
        CollectionStore::for_partition(Arc::clone(&self.backend), partition)
    }

    fn notify(
        &self,
        ctx: &RequestContext,
        partition: &Partition,
        operation: Operation,
        payload: Document,
    ) {
        self.notifier.dispatch(self.builder.build(
            operation,
            payload,
            ctx.options.clone(),
            partition.type_name(),
            partition.app_id(),
            &ctx.token,
        ));
    }

    /// Inserts a document into the partition and dispatches one CREATE
    /// message whose payload is the supplied document plus the assigned
    /// identifier. Returns the identifier.
    pub async fn insert(
        &self,
        ctx: &RequestContext,
        partition: &Partition,
        document: Document,
    ) -> StoreResult<String> {
        self.registry
            .ensure_type(partition.app_id(), partition.type_name());

        let mut payload = document.clone();
        let id = self.store(partition).insert(document).await?;
        payload.insert(FIELD_ID, id.clone());

        self.notify(ctx, partition, Operation::Create, payload);

        Ok(id)
    }

    /// Returns the matching documents of the partition. Reads produce no
    /// change message.
    pub async fn find(
        &self,
        _ctx: &RequestContext,
        partition: &Partition,
        filter: Option<Document>,
        projection: Option<Document>,
    ) -> StoreResult<Vec<Document>> {
        self.registry
            .ensure_type(partition.app_id(), partition.type_name());

        self.store(partition).find(filter, projection).await
    }

    /// Returns the document with the given identifier.
    pub async fn find_by_id(
        &self,
        _ctx: &RequestContext,
        partition: &Partition,
        id: &str,
    ) -> StoreResult<Document> {
        self.registry
            .ensure_type(partition.app_id(), partition.type_name());

        self.store(partition).find_by_id(id).await
    }

    /// Merges `changes` into the document and dispatches one UPDATE message.
    /// The payload is the minimal known delta: the partial update plus the
    /// identifier. A missing document yields NotFound and no message.
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        partition: &Partition,
        id: &str,
        changes: Document,
    ) -> StoreResult<()> {
        self.registry
            .ensure_type(partition.app_id(), partition.type_name());

        let mut payload = changes.clone();
        self.store(partition).update_by_id(id, changes).await?;
        payload.insert(FIELD_ID, id.to_string());

        self.notify(ctx, partition, Operation::Update, payload);

        Ok(())
    }

    /// Deletes the document and dispatches one DELETE message carrying just
    /// the identifier. A missing document yields NotFound and no message.
    pub async fn remove_by_id(
        &self,
        ctx: &RequestContext,
        partition: &Partition,
        id: &str,
    ) -> StoreResult<()> {
        self.registry
            .ensure_type(partition.app_id(), partition.type_name());

        self.store(partition).remove_by_id(id).await?;

        let mut payload = Document::new();
        payload.insert(FIELD_ID, id.to_string());

        self.notify(ctx, partition, Operation::Delete, payload);

        Ok(())
    }

    /// Removes a type entirely: pulls it from the application's known-types
    /// set and drops the backing partition. Idempotent; produces no change
    /// message.
    pub async fn remove_type(
        &self,
        _ctx: &RequestContext,
        partition: &Partition,
    ) -> StoreResult<()> {
        self.registry
            .remove_type(partition.app_id(), partition.type_name())
            .await
    }

    /// Lists the application's known types from the registry.
    pub async fn types(&self, _ctx: &RequestContext, app_id: &str) -> StoreResult<Vec<String>> {
        self.registry.types(app_id).await
    }
}
