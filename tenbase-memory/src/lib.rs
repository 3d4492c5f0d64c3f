//! In-memory storage backend for tenbase.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreBackend` trait. It uses async-aware read-write locks for concurrent
//! access and is ideal for development and testing: partitions are plain
//! maps, drops of absent partitions succeed, and catalog set operations
//! follow the same idempotent semantics as the persistent backend.
//!
//! # Quick Start
//!
//! ```ignore
//! use tenbase_memory::MemoryStore;
//! use tenbase_core::{backend::StoreBackend, document::Partition, store::CollectionStore};
//! use bson::doc;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(MemoryStore::new());
//!     let store = CollectionStore::for_partition(backend, &Partition::new("a1", "person"));
//!
//!     let id = store.insert(doc! { "name": "Ann" }).await?;
//!     let person = store.find_by_id(&id).await?;
//!     assert_eq!(person.get_str("name")?, "Ann");
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as tenbase_memory;

pub mod store;

pub use store::{MemoryStore, MemoryStoreBuilder};
