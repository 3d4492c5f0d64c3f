//! MongoDB backend for tenbase.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend`
//! trait. Connections are pooled process-wide by connection string: the first
//! use of a connection string dials the server (a failure there is fatal for
//! that store), and every subsequent logical operation acquires its own cheap
//! session handle. Required indexes are ensured at most once per pooled
//! connection, before the first operation on the indexed collection.
//!
//! To use this backend, enable the `mongodb` feature of the `tenbase` crate:
//!
//! ```toml
//! [dependencies]
//! tenbase = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tenbase_core::{backend::StoreBackendBuilder, config::StoreConfig};
//! use tenbase_mongodb::MongoStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoStore::builder(&StoreConfig::default())
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as tenbase_mongodb;

pub mod pool;
pub mod sanitizer;
pub mod store;

pub use pool::SessionHandle;
pub use store::{MongoStore, MongoStoreBuilder};
