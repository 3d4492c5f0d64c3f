//! Main tenbase crate providing a unified interface to the multi-tenant
//! document store.
//!
//! This crate is the primary entry point for users of the tenbase framework.
//! It re-exports the core types from `tenbase-core` and provides convenient
//! access to the storage backends.
//!
//! # Features
//!
//! - **Dynamic types** - Client applications define data types on the fly;
//!   each `(application, type)` pair maps to one physical partition, created
//!   implicitly on first write
//! - **Change notifications** - Every accepted mutation is translated into
//!   exactly one structured change message and dispatched asynchronously to a
//!   pluggable transport, without holding the caller's response
//! - **Type registry** - Best-effort, eventually-consistent bookkeeping of an
//!   application's known types
//! - **Multiple backends** - In-memory for development and tests, MongoDB for
//!   persistent deployments (behind the `mongodb` feature)
//!
//! # Quick Start
//!
//! ```ignore
//! use tenbase::{prelude::*, memory::MemoryStore};
//! use bson::doc;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct LogTransport;
//!
//! #[async_trait::async_trait]
//! impl NotificationTransport for LogTransport {
//!     async fn publish(&self, message: ChangeMessage) -> StoreResult<()> {
//!         println!("change: {message:?}");
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     let backend = Arc::new(MemoryStore::new());
//!     let service = TypeService::new(backend, &StoreConfig::default(), Arc::new(LogTransport));
//!
//!     let ctx = RequestContext::new("api-key");
//!     let partition = Partition::new("a1", "person");
//!
//!     // Insert a document; a CREATE change message is dispatched without
//!     // blocking this call.
//!     let id = service.insert(&ctx, &partition, doc! { "name": "Ann" }).await?;
//!
//!     // Read it back; reads never produce change messages.
//!     let person = service.find_by_id(&ctx, &partition, &id).await?;
//!     assert_eq!(person.get_str("name").unwrap(), "Ann");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb` feature)

pub mod prelude;

pub use tenbase_core::{backend, config, document, error, message, notify, registry, service, store};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use tenbase_memory::{MemoryStore, MemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use tenbase_mongodb::{MongoStore, MongoStoreBuilder, SessionHandle};
}
