//! docstore - Lazy, idempotent provisioning and typed CRUD access for
//! remote document databases.
//!
//! The crate layers four pieces, each depending only on the one below:
//!
//! - [`RepositoryBase`] — typed facade for one document shape
//! - [`DocumentDb`] — generic CRUD accessor over the provisioned collection
//! - provisioning — read-or-create for databases, collections, triggers and
//!   stored procedures, idempotent by id
//! - [`ConnectionManager`] — the single lazily built client handle
//!
//! Databases, collections and server-side definitions are provisioned on
//! the first document operation and cached for the life of the process.
//! Backends plug in through the [`DocumentStoreClient`] trait;
//! [`InMemoryClient`] ships for tests and local development.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docstore::{
//!     ConnectionManager, DbSettings, DocumentDb, FeedOptions, InMemoryClient,
//!     InMemoryConnector, RepositoryExt, RequestOptions,
//! };
//!
//! let connector = InMemoryConnector::new(InMemoryClient::new());
//! let manager = Arc::new(ConnectionManager::new(settings, connector));
//! let db = DocumentDb::new(manager);
//!
//! let orders = db.repository::<Order>();
//! orders.create(&order, &RequestOptions::default()).await?;
//! let found = orders.get("order-1", &FeedOptions::default()).await?;
//! ```
//!
//! All operations are plain futures: drop one (for example through
//! `tokio::time::timeout`) to cancel the in-flight call. The crate performs
//! no retry or backoff of its own; failures surface immediately as typed
//! errors.

mod client;
mod connection;
mod db;
mod provisioning;
mod repository;
mod settings;

pub use client::{
    ClientError, CollectionRef, DatabaseRef, DocumentPage, DocumentStoreClient, FeedOptions,
    InMemoryClient, InMemoryConnector, OpCounts, PartitionKey, RequestOptions, ResourceKind,
};
pub use connection::{Connect, ConnectionError, ConnectionManager};
pub use db::{DocumentDb, DocumentError, DocumentQuery};
pub use provisioning::{
    ensure_collection, ensure_database, ensure_stored_procedures, ensure_triggers,
    ProvisioningError,
};
pub use repository::{DocumentBase, RepositoryBase, RepositoryExt};
pub use settings::{
    DbSettings, StoredProcedureDefinition, TriggerDefinition, TriggerOperation, TriggerType,
};
