use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    error::ErrorKind,
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};
use tenbase_core::{
    backend::{IndexSpec, StoreBackend, StoreBackendBuilder},
    config::StoreConfig,
    error::{StoreError, StoreResult},
};

use crate::{pool, sanitizer::KeySanitizer};

/// MongoDB server error code for "namespace does not exist".
const NAMESPACE_NOT_FOUND: i32 = 26;

/// MongoDB implementation of the store backend.
///
/// The store holds no client of its own: every operation acquires a
/// [`SessionHandle`](crate::pool::SessionHandle) from the process-wide pool
/// and releases it on exit, so store values are cheap to clone per request.
#[derive(Debug, Clone)]
pub struct MongoStore {
    connection_string: String,
    database: String,
}

impl MongoStore {
    /// Creates a builder from resolved configuration. The builder registers
    /// the application catalog's unique name index by default.
    pub fn builder(config: &StoreConfig) -> MongoStoreBuilder {
        MongoStoreBuilder::new(config)
    }

    async fn collection(&self, name: &str) -> StoreResult<Collection<Document>> {
        let session = pool::acquire(&self.connection_string).await?;

        Ok(session.collection(&self.database, &KeySanitizer::sanitize_collection(name)))
    }

    fn backend_err(err: mongodb::error::Error) -> StoreError {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl StoreBackend for MongoStore {
    async fn insert_document(&self, collection: &str, document: Document) -> StoreResult<()> {
        self.collection(collection)
            .await?
            .insert_one(KeySanitizer::sanitize_keys(&document))
            .await
            .map_err(Self::backend_err)?;

        Ok(())
    }

    async fn find_documents(
        &self,
        collection: &str,
        filter: Option<Document>,
        projection: Option<Document>,
    ) -> StoreResult<Vec<Document>> {
        let mut options = FindOptions::default();
        options.projection = projection
            .as_ref()
            .map(KeySanitizer::sanitize_keys);

        Ok(self
            .collection(collection)
            .await?
            .find(
                filter
                    .as_ref()
                    .map(KeySanitizer::sanitize_keys)
                    .unwrap_or_default(),
            )
            .with_options(options)
            .await
            .map_err(Self::backend_err)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(Self::backend_err)?
            .iter()
            .map(KeySanitizer::restore_keys)
            .collect())
    }

    async fn find_document(&self, collection: &str, id: &str) -> StoreResult<Document> {
        self.collection(collection)
            .await?
            .find_one(doc! { "_id": id })
            .await
            .map_err(Self::backend_err)?
            .map(|document| KeySanitizer::restore_keys(&document))
            .ok_or_else(|| StoreError::NotFound(id.to_string(), collection.to_string()))
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> StoreResult<()> {
        let result = self
            .collection(collection)
            .await?
            .update_one(
                doc! { "_id": id },
                doc! { "$set": KeySanitizer::sanitize_keys(&changes) },
            )
            .await
            .map_err(Self::backend_err)?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound(id.to_string(), collection.to_string()));
        }

        Ok(())
    }

    async fn remove_document(&self, collection: &str, id: &str) -> StoreResult<()> {
        let result = self
            .collection(collection)
            .await?
            .delete_one(doc! { "_id": id })
            .await
            .map_err(Self::backend_err)?;

        if result.deleted_count == 0 {
            return Err(StoreError::NotFound(id.to_string(), collection.to_string()));
        }

        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        match self.collection(collection).await?.drop().await {
            Ok(()) => Ok(()),
            // Dropping an already-nonexistent partition is not an error;
            // matched on the server's structured condition, not its message.
            Err(err) => match *err.kind {
                ErrorKind::Command(ref command) if command.code == NAMESPACE_NOT_FOUND => Ok(()),
                _ => Err(Self::backend_err(err)),
            },
        }
    }

    async fn add_to_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Bson,
    ) -> StoreResult<()> {
        self.collection(collection)
            .await?
            .update_one(
                doc! { "_id": id },
                doc! { "$addToSet": { field: value } },
            )
            .upsert(true)
            .await
            .map_err(Self::backend_err)?;

        Ok(())
    }

    async fn pull_from_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Bson,
    ) -> StoreResult<()> {
        // Pulling from an absent record matches nothing, which is the
        // required no-op.
        self.collection(collection)
            .await?
            .update_one(
                doc! { "_id": id },
                doc! { "$pull": { field: value } },
            )
            .await
            .map_err(Self::backend_err)?;

        Ok(())
    }

    async fn ensure_index(&self, collection: &str, spec: &IndexSpec) -> StoreResult<()> {
        if !pool::mark_index_ensured(&self.connection_string, collection).await {
            return Ok(());
        }

        tracing::info!(collection, field = %spec.field, "ensuring index");

        self.collection(collection)
            .await?
            .create_index(
                IndexModel::builder()
                    .keys(doc! { spec.field.clone(): 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(spec.unique)
                            .sparse(spec.sparse)
                            .build(),
                    )
                    .build(),
            )
            .await
            // The collection cannot safely serve its uniqueness contract
            // without the index, so bootstrap failure is fatal.
            .map_err(|err| StoreError::Config(err.to_string()))?;

        Ok(())
    }
}

/// Builder dialing the pool and running one-time index bootstrap.
pub struct MongoStoreBuilder {
    config: StoreConfig,
    indexes: Vec<(String, IndexSpec)>,
}

impl MongoStoreBuilder {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            config: config.clone(),
            // The application catalog carries a unique, non-sparse,
            // background-built index over the name field.
            indexes: vec![(
                config.applications_collection.clone(),
                IndexSpec::unique_on("name"),
            )],
        }
    }

    /// Registers an additional index to ensure at build time.
    pub fn index(mut self, collection: impl Into<String>, spec: IndexSpec) -> Self {
        self.indexes.push((collection.into(), spec));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoStoreBuilder {
    type Backend = MongoStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        // First use of the connection string dials the backing store; a
        // failure here is fatal for every request against it.
        pool::acquire(&self.config.connection_string).await?;

        let store = MongoStore {
            connection_string: self.config.connection_string.clone(),
            database: self.config.database.clone(),
        };

        for (collection, spec) in &self.indexes {
            store.ensure_index(collection, spec).await?;
        }

        Ok(store)
    }
}
