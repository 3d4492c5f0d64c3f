//! Best-effort registration of type names into an application's known-types
//! set.
//!
//! The registry is advisory metadata used for listing an application's known
//! types. It is not required for correctness of the type-scoped store, which
//! works off the physical partition regardless of registry state. Updates are
//! dispatched without waiting for completion, so a window exists where a
//! type's data is readable before the registry reflects it; set semantics
//! make concurrent registrations safe (idempotent union).

use bson::{Bson, Document};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    backend::StoreBackend,
    config::StoreConfig,
    document::Partition,
    error::StoreResult,
};

/// Field of the application catalog record holding the known-types set.
pub const FIELD_TYPES: &str = "types";

/// Maintains the `types` set of application catalog records.
#[derive(Debug)]
pub struct TypeRegistry<B> {
    backend: Arc<B>,
    applications: String,
}

// Manual impl: a derived Clone would demand `B: Clone`, but only the Arc is
// cloned.
impl<B> Clone for TypeRegistry<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            applications: self.applications.clone(),
        }
    }
}

impl<B: StoreBackend + 'static> TypeRegistry<B> {
    pub fn new(backend: Arc<B>, config: &StoreConfig) -> Self {
        Self {
            backend,
            applications: config.applications_collection.clone(),
        }
    }

    /// Fire-and-forget registration: adds `type_name` to the application's
    /// known-types set on a detached task. Failures are logged, never
    /// propagated; the triggering request does not wait for this op.
    pub fn ensure_type(&self, app_id: &str, type_name: &str) -> JoinHandle<()> {
        let registry = self.clone();
        let app_id = app_id.to_string();
        let type_name = type_name.to_string();

        tokio::spawn(async move {
            if let Err(err) = registry.register(&app_id, &type_name).await {
                tracing::warn!(
                    app_id = %app_id,
                    type_name = %type_name,
                    error = %err,
                    "type registration failed",
                );
            }
        })
    }

    /// Awaitable inner op behind [`ensure_type`](Self::ensure_type).
    /// Duplicates are no-ops.
    pub async fn register(&self, app_id: &str, type_name: &str) -> StoreResult<()> {
        self.backend
            .add_to_set(
                &self.applications,
                app_id,
                FIELD_TYPES,
                Bson::String(type_name.to_string()),
            )
            .await
    }

    /// Removes a type: pulls its name from the application's known-types set
    /// and drops the backing partition. Dropping an already-nonexistent
    /// partition succeeds, so removal is idempotent end to end.
    pub async fn remove_type(&self, app_id: &str, type_name: &str) -> StoreResult<()> {
        self.backend
            .pull_from_set(
                &self.applications,
                app_id,
                FIELD_TYPES,
                Bson::String(type_name.to_string()),
            )
            .await?;

        self.backend
            .drop_collection(&Partition::new(app_id, type_name).collection_name())
            .await
    }

    /// Lists the application's known types from the catalog record. An
    /// application without a catalog record (or without the field) has no
    /// known types.
    pub async fn types(&self, app_id: &str) -> StoreResult<Vec<String>> {
        let record: Document = match self
            .backend
            .find_document(&self.applications, app_id)
            .await
        {
            Ok(record) => record,
            Err(crate::error::StoreError::NotFound(..)) => return Ok(vec![]),
            Err(err) => return Err(err),
        };

        Ok(record
            .get_array(FIELD_TYPES)
            .map(|types| {
                types
                    .iter()
                    .filter_map(|value| value.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }
}
