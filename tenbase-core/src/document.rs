//! Document and partition model.
//!
//! Documents are schemaless: an ordered string-to-value mapping
//! ([`bson::Document`]) with no compile-time shape. The store only reserves
//! two fields, the identifier and the server-assigned creation timestamp;
//! every other field passes through untouched.

use bson::{Bson, DateTime, Document};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Reserved identifier field.
pub const FIELD_ID: &str = "_id";
/// Reserved creation timestamp field, set exactly once at insertion time.
pub const FIELD_CREATED_AT: &str = "createdAt";

/// A named, schemaless data partition scoped to one application.
///
/// A partition is not a standalone entity: it is identified by the
/// `(applicationId, typeName)` pair and resolves to exactly one physical
/// collection, created implicitly on first write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    app_id: String,
    type_name: String,
}

impl Partition {
    /// Creates a partition identity for the given application and type name.
    pub fn new(app_id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            type_name: type_name.into(),
        }
    }

    /// Returns the owning application's identifier.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the type name within the application.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the deterministic name of the physical collection backing this
    /// partition.
    pub fn collection_name(&self) -> String {
        format!("{}.{}", self.app_id, self.type_name)
    }
}

/// Returns the document's identifier, inserting a freshly generated UUID
/// string when the caller did not supply one.
///
/// Callers that need a client-visible, predictable key supply `_id`
/// themselves; it must be a string.
pub fn ensure_id(document: &mut Document) -> StoreResult<String> {
    match document.get(FIELD_ID) {
        Some(Bson::String(id)) => Ok(id.clone()),
        Some(other) => Err(StoreError::Serialization(format!(
            "document identifier must be a string, got {:?}",
            other.element_type(),
        ))),
        None => {
            let id = Uuid::new_v4().to_string();
            document.insert(FIELD_ID, id.clone());
            Ok(id)
        }
    }
}

/// Stamps the server-assigned creation timestamp. Set exactly once,
/// server-side, and immutable thereafter.
pub fn stamp_created_at(document: &mut Document) {
    document.insert(FIELD_CREATED_AT, DateTime::now());
}
