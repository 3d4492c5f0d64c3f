//! Core of the tenbase multi-tenant document store.
//!
//! Client applications define data "types" on the fly and perform CRUD
//! against them; every mutation is mirrored into an asynchronous
//! change-notification pipeline for downstream consumers. This crate
//! provides:
//!
//! - **Backend abstraction** ([`backend`]) - Traits for implementing physical
//!   storage backends, plus index specifications
//! - **Document and partition model** ([`document`]) - Schemaless documents
//!   and the `(application, type)` partition identity
//! - **Type-scoped store** ([`store`]) - CRUD over one resolved collection
//! - **Type registry** ([`registry`]) - Best-effort bookkeeping of an
//!   application's known types
//! - **Change messages** ([`message`], [`notify`]) - Construction and
//!   detached dispatch of structured change messages
//! - **Service orchestration** ([`service`]) - The inbound surface wiring
//!   store, registry, and notifier together
//! - **Configuration** ([`config`]) - Connection string and system
//!   collection names, resolved once at startup
//! - **Error handling** ([`error`]) - Error taxonomy and result alias
//!
//! # Example
//!
//! ```ignore
//! use tenbase_core::{config::StoreConfig, document::Partition, service::{RequestContext, TypeService}};
//! use bson::doc;
//! use std::sync::Arc;
//!
//! let service = TypeService::new(backend, &StoreConfig::default(), transport);
//! let ctx = RequestContext::new("api-key");
//! let partition = Partition::new("a1", "person");
//!
//! let id = service.insert(&ctx, &partition, doc! { "name": "Ann" }).await?;
//! # Ok::<(), tenbase_core::error::StoreError>(())
//! ```

#[allow(unused_extern_crates)]
extern crate self as tenbase_core;

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod message;
pub mod notify;
pub mod registry;
pub mod service;
pub mod store;
