//! Convenient re-exports of commonly used types from tenbase.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use tenbase::prelude::*;
//! ```

pub use tenbase_core::{
    backend::{IndexSpec, StoreBackend, StoreBackendBuilder},
    config::StoreConfig,
    document::{Partition, FIELD_CREATED_AT, FIELD_ID},
    error::{StoreError, StoreResult},
    message::{ChangeMessage, MessageBuilder, Operation, ORIGIN_API},
    notify::{NotificationTransport, Notifier},
    registry::TypeRegistry,
    service::{RequestContext, TypeService},
    store::CollectionStore,
};
