//! Client - The opaque capability surface of a remote document store.
//!
//! [`DocumentStoreClient`] is the seam between this crate and whatever wire
//! protocol the store speaks. Everything above it (provisioning, the
//! [`DocumentDb`](crate::DocumentDb) accessor, typed repositories) is written
//! against this trait, so backends are swappable: the crate ships
//! [`InMemoryClient`] for tests and local development, and a real network
//! client implements the same trait.
//!
//! Documents cross this boundary as `serde_json::Value`; typed access is
//! layered on top by the accessor and repositories.

mod error;
mod in_memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::settings::{StoredProcedureDefinition, TriggerDefinition};

pub use error::{ClientError, ResourceKind};
pub use in_memory::{InMemoryClient, InMemoryConnector, OpCounts};

/// A value routing single-document operations to one physical partition.
///
/// If the collection is partitioned, every point operation (get, replace,
/// delete) on a document must carry the same partition key the document was
/// created with. Omitting it degenerates to a cross-partition scan, which is
/// expensive and returns matches in undefined order — the operation still
/// works, but treat a missing key on a partitioned collection as a caller
/// bug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PartitionKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PartitionKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Options for read/query operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedOptions {
    /// Maximum number of documents per fetched page. `None` uses the
    /// backend's default.
    pub max_item_count: Option<usize>,
    /// Restrict the operation to a single partition.
    pub partition_key: Option<PartitionKey>,
}

impl FeedOptions {
    pub fn partition(key: impl Into<PartitionKey>) -> Self {
        Self {
            max_item_count: None,
            partition_key: Some(key.into()),
        }
    }
}

/// Options for write operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Route the write to a single partition.
    pub partition_key: Option<PartitionKey>,
}

impl RequestOptions {
    pub fn partition(key: impl Into<PartitionKey>) -> Self {
        Self {
            partition_key: Some(key.into()),
        }
    }
}

/// A handle to a remote logical database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRef {
    pub id: String,
}

/// A handle to a remote document collection within a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub database_id: String,
    pub id: String,
}

/// One page of query results plus the continuation for the next page.
///
/// `continuation` of `None` means the query is exhausted.
#[derive(Debug, Clone, Default)]
pub struct DocumentPage {
    pub documents: Vec<Value>,
    pub continuation: Option<String>,
}

/// Abstract CRUD and query surface of a remote document store.
///
/// Mirrors the primitive operations the store exposes over its network
/// protocol: database/collection/trigger/procedure read-or-create primitives
/// and document CRUD. Implementations must be safe to share across tasks;
/// all methods are independent round trips with no ordering guarantees
/// between them.
#[async_trait]
pub trait DocumentStoreClient: Send + Sync {
    /// Query for a database by id. Returns `None` if absent.
    async fn query_database(&self, id: &str) -> Result<Option<DatabaseRef>, ClientError>;

    /// Create a database. Fails with [`ClientError::Conflict`] if one with
    /// the same id already exists.
    async fn create_database(&self, id: &str) -> Result<DatabaseRef, ClientError>;

    /// Query for a collection by id within a database. Returns `None` if absent.
    async fn query_collection(
        &self,
        database: &DatabaseRef,
        id: &str,
    ) -> Result<Option<CollectionRef>, ClientError>;

    /// Create a collection. `offer_type` is the throughput tier applied at
    /// creation time.
    async fn create_collection(
        &self,
        database: &DatabaseRef,
        id: &str,
        offer_type: &str,
    ) -> Result<CollectionRef, ClientError>;

    /// Fetch one page of documents.
    ///
    /// `filter_id` narrows the query to documents with that id. A partition
    /// key in `feed` routes the query to a single partition; without one the
    /// query scans all partitions.
    async fn query_documents(
        &self,
        collection: &CollectionRef,
        filter_id: Option<&str>,
        feed: &FeedOptions,
        continuation: Option<&str>,
    ) -> Result<DocumentPage, ClientError>;

    /// Insert a document. Fails with [`ClientError::Conflict`] when a
    /// document with the same id already exists in the target partition.
    async fn create_document(
        &self,
        collection: &CollectionRef,
        document: Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError>;

    /// Replace an existing document wholesale.
    async fn replace_document(
        &self,
        collection: &CollectionRef,
        id: &str,
        document: Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError>;

    /// Delete a document by id.
    async fn delete_document(
        &self,
        collection: &CollectionRef,
        id: &str,
        options: &RequestOptions,
    ) -> Result<(), ClientError>;

    /// Query for a trigger by id. Returns `None` if absent.
    async fn query_trigger(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<TriggerDefinition>, ClientError>;

    /// Create a trigger on the collection.
    async fn create_trigger(
        &self,
        collection: &CollectionRef,
        trigger: &TriggerDefinition,
    ) -> Result<(), ClientError>;

    /// Query for a stored procedure by id. Returns `None` if absent.
    async fn query_stored_procedure(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<StoredProcedureDefinition>, ClientError>;

    /// Create a stored procedure on the collection.
    async fn create_stored_procedure(
        &self,
        collection: &CollectionRef,
        procedure: &StoredProcedureDefinition,
    ) -> Result<(), ClientError>;

    /// Invoke a stored procedure with positional JSON parameters.
    ///
    /// No validation of parameter arity or types is performed; the return
    /// value is whatever the procedure yields.
    async fn execute_stored_procedure(
        &self,
        collection: &CollectionRef,
        id: &str,
        params: &[Value],
        partition_key: Option<&PartitionKey>,
    ) -> Result<Value, ClientError>;
}

impl std::fmt::Debug for dyn DocumentStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DocumentStoreClient")
    }
}
