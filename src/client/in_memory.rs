//! InMemoryClient - HashMap-backed document store for testing and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::connection::{Connect, ConnectionError};
use crate::settings::{DbSettings, StoredProcedureDefinition, TriggerDefinition};

use super::{
    ClientError, CollectionRef, DatabaseRef, DocumentPage, DocumentStoreClient, FeedOptions,
    PartitionKey, RequestOptions, ResourceKind,
};

const DEFAULT_PAGE_SIZE: usize = 100;

type ProcedureHandler = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Storage key for a document: partition first so a partition's documents
/// are contiguous in iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DocKey {
    partition: Option<String>,
    id: String,
}

#[derive(Default)]
struct CollectionState {
    offer_type: String,
    documents: BTreeMap<DocKey, Value>,
    triggers: BTreeMap<String, TriggerDefinition>,
    procedures: BTreeMap<String, StoredProcedureDefinition>,
}

#[derive(Default)]
struct DatabaseState {
    collections: BTreeMap<String, CollectionState>,
}

/// Counters for every remote operation the client has performed.
///
/// Used by tests to assert provisioning idempotence and lazy-initialization
/// behavior without instrumenting the code under test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub databases_queried: usize,
    pub databases_created: usize,
    pub collections_queried: usize,
    pub collections_created: usize,
    pub triggers_queried: usize,
    pub triggers_created: usize,
    pub procedures_queried: usize,
    pub procedures_created: usize,
    pub documents_queried: usize,
    pub documents_created: usize,
    pub documents_replaced: usize,
    pub documents_deleted: usize,
    pub procedures_executed: usize,
}

/// In-memory document store backend.
///
/// Implements the full [`DocumentStoreClient`] capability set over nested
/// maps. Clone-friendly via `Arc`; clones share storage. Stored procedures
/// execute registered Rust handlers (see
/// [`with_procedure_handler`](InMemoryClient::with_procedure_handler)); a
/// procedure without a handler echoes its parameters back as a JSON array.
#[derive(Clone, Default)]
pub struct InMemoryClient {
    databases: Arc<RwLock<BTreeMap<String, DatabaseState>>>,
    handlers: Arc<RwLock<HashMap<String, ProcedureHandler>>>,
    counts: Arc<RwLock<OpCounts>>,
}

impl InMemoryClient {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Rust handler invoked when the stored procedure with the
    /// given id is executed. Builder pattern — returns `self` for chaining.
    pub fn with_procedure_handler<F>(self, id: &str, handler: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.insert(id.to_string(), Arc::new(handler));
        }
        self
    }

    /// Offer type recorded when the collection was created, if it exists.
    pub fn collection_offer_type(&self, collection: &CollectionRef) -> Option<String> {
        let databases = self.databases.read().ok()?;
        collection_state(&databases, collection)
            .ok()
            .map(|coll| coll.offer_type.clone())
    }

    /// Snapshot of the operation counters.
    pub fn op_counts(&self) -> OpCounts {
        self.counts
            .read()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    fn count<F: FnOnce(&mut OpCounts)>(&self, bump: F) {
        if let Ok(mut counts) = self.counts.write() {
            bump(&mut counts);
        }
    }

    fn document_id(document: &Value) -> Result<String, ClientError> {
        document
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Serde("document is missing a string 'id' field".into()))
    }
}

fn poisoned(_: impl std::fmt::Debug) -> ClientError {
    ClientError::Transport("store lock poisoned".into())
}

fn partition_of(key: Option<&PartitionKey>) -> Option<String> {
    key.map(|k| k.as_str().to_string())
}

/// Locate a document key by id, honoring partition routing: a supplied
/// partition key addresses one partition directly, no key scans them all.
fn locate(
    collection: &CollectionState,
    id: &str,
    partition: Option<&PartitionKey>,
) -> Option<DocKey> {
    match partition {
        Some(key) => {
            let doc_key = DocKey {
                partition: Some(key.as_str().to_string()),
                id: id.to_string(),
            };
            collection.documents.contains_key(&doc_key).then_some(doc_key)
        }
        None => collection
            .documents
            .keys()
            .find(|key| key.id == id)
            .cloned(),
    }
}

#[async_trait]
impl DocumentStoreClient for InMemoryClient {
    async fn query_database(&self, id: &str) -> Result<Option<DatabaseRef>, ClientError> {
        self.count(|c| c.databases_queried += 1);
        let databases = self.databases.read().map_err(poisoned)?;
        Ok(databases.contains_key(id).then(|| DatabaseRef { id: id.to_string() }))
    }

    async fn create_database(&self, id: &str) -> Result<DatabaseRef, ClientError> {
        self.count(|c| c.databases_created += 1);
        let mut databases = self.databases.write().map_err(poisoned)?;
        if databases.contains_key(id) {
            return Err(ClientError::Conflict {
                kind: ResourceKind::Database,
                id: id.to_string(),
            });
        }
        databases.insert(id.to_string(), DatabaseState::default());
        Ok(DatabaseRef { id: id.to_string() })
    }

    async fn query_collection(
        &self,
        database: &DatabaseRef,
        id: &str,
    ) -> Result<Option<CollectionRef>, ClientError> {
        self.count(|c| c.collections_queried += 1);
        let databases = self.databases.read().map_err(poisoned)?;
        let db = databases
            .get(&database.id)
            .ok_or_else(|| ClientError::NotFound {
                kind: ResourceKind::Database,
                id: database.id.clone(),
            })?;
        Ok(db.collections.contains_key(id).then(|| CollectionRef {
            database_id: database.id.clone(),
            id: id.to_string(),
        }))
    }

    async fn create_collection(
        &self,
        database: &DatabaseRef,
        id: &str,
        offer_type: &str,
    ) -> Result<CollectionRef, ClientError> {
        self.count(|c| c.collections_created += 1);
        let mut databases = self.databases.write().map_err(poisoned)?;
        let db = databases
            .get_mut(&database.id)
            .ok_or_else(|| ClientError::NotFound {
                kind: ResourceKind::Database,
                id: database.id.clone(),
            })?;
        if db.collections.contains_key(id) {
            return Err(ClientError::Conflict {
                kind: ResourceKind::Collection,
                id: id.to_string(),
            });
        }
        db.collections.insert(
            id.to_string(),
            CollectionState {
                offer_type: offer_type.to_string(),
                ..CollectionState::default()
            },
        );
        Ok(CollectionRef {
            database_id: database.id.clone(),
            id: id.to_string(),
        })
    }

    async fn query_documents(
        &self,
        collection: &CollectionRef,
        filter_id: Option<&str>,
        feed: &FeedOptions,
        continuation: Option<&str>,
    ) -> Result<DocumentPage, ClientError> {
        self.count(|c| c.documents_queried += 1);
        let databases = self.databases.read().map_err(poisoned)?;
        let coll = collection_state(&databases, collection)?;

        let partition = partition_of(feed.partition_key.as_ref());
        let matches: Vec<&Value> = coll
            .documents
            .iter()
            .filter(|(key, _)| partition.is_none() || key.partition == partition)
            .filter(|(key, _)| filter_id.is_none_or(|id| key.id == id))
            .map(|(_, doc)| doc)
            .collect();

        let offset: usize = continuation
            .map(str::parse)
            .transpose()
            .map_err(|_| ClientError::Transport("malformed continuation token".into()))?
            .unwrap_or(0);
        let page_size = feed.max_item_count.unwrap_or(DEFAULT_PAGE_SIZE);

        let documents: Vec<Value> = matches
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|doc| (*doc).clone())
            .collect();
        let next = offset + documents.len();
        let continuation = (next < matches.len()).then(|| next.to_string());

        Ok(DocumentPage {
            documents,
            continuation,
        })
    }

    async fn create_document(
        &self,
        collection: &CollectionRef,
        document: Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        self.count(|c| c.documents_created += 1);
        let id = Self::document_id(&document)?;
        let mut databases = self.databases.write().map_err(poisoned)?;
        let coll = collection_state_mut(&mut databases, collection)?;

        let key = DocKey {
            partition: partition_of(options.partition_key.as_ref()),
            id: id.clone(),
        };
        if coll.documents.contains_key(&key) {
            return Err(ClientError::Conflict {
                kind: ResourceKind::Document,
                id,
            });
        }
        coll.documents.insert(key, document.clone());
        Ok(document)
    }

    async fn replace_document(
        &self,
        collection: &CollectionRef,
        id: &str,
        document: Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        self.count(|c| c.documents_replaced += 1);
        let mut databases = self.databases.write().map_err(poisoned)?;
        let coll = collection_state_mut(&mut databases, collection)?;

        let key = locate(coll, id, options.partition_key.as_ref()).ok_or_else(|| {
            ClientError::NotFound {
                kind: ResourceKind::Document,
                id: id.to_string(),
            }
        })?;
        coll.documents.insert(key, document.clone());
        Ok(document)
    }

    async fn delete_document(
        &self,
        collection: &CollectionRef,
        id: &str,
        options: &RequestOptions,
    ) -> Result<(), ClientError> {
        self.count(|c| c.documents_deleted += 1);
        let mut databases = self.databases.write().map_err(poisoned)?;
        let coll = collection_state_mut(&mut databases, collection)?;

        let key = locate(coll, id, options.partition_key.as_ref()).ok_or_else(|| {
            ClientError::NotFound {
                kind: ResourceKind::Document,
                id: id.to_string(),
            }
        })?;
        coll.documents.remove(&key);
        Ok(())
    }

    async fn query_trigger(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<TriggerDefinition>, ClientError> {
        self.count(|c| c.triggers_queried += 1);
        let databases = self.databases.read().map_err(poisoned)?;
        let coll = collection_state(&databases, collection)?;
        Ok(coll.triggers.get(id).cloned())
    }

    async fn create_trigger(
        &self,
        collection: &CollectionRef,
        trigger: &TriggerDefinition,
    ) -> Result<(), ClientError> {
        self.count(|c| c.triggers_created += 1);
        let mut databases = self.databases.write().map_err(poisoned)?;
        let coll = collection_state_mut(&mut databases, collection)?;
        if coll.triggers.contains_key(&trigger.id) {
            return Err(ClientError::Conflict {
                kind: ResourceKind::Trigger,
                id: trigger.id.clone(),
            });
        }
        coll.triggers.insert(trigger.id.clone(), trigger.clone());
        Ok(())
    }

    async fn query_stored_procedure(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<StoredProcedureDefinition>, ClientError> {
        self.count(|c| c.procedures_queried += 1);
        let databases = self.databases.read().map_err(poisoned)?;
        let coll = collection_state(&databases, collection)?;
        Ok(coll.procedures.get(id).cloned())
    }

    async fn create_stored_procedure(
        &self,
        collection: &CollectionRef,
        procedure: &StoredProcedureDefinition,
    ) -> Result<(), ClientError> {
        self.count(|c| c.procedures_created += 1);
        let mut databases = self.databases.write().map_err(poisoned)?;
        let coll = collection_state_mut(&mut databases, collection)?;
        if coll.procedures.contains_key(&procedure.id) {
            return Err(ClientError::Conflict {
                kind: ResourceKind::StoredProcedure,
                id: procedure.id.clone(),
            });
        }
        coll.procedures
            .insert(procedure.id.clone(), procedure.clone());
        Ok(())
    }

    async fn execute_stored_procedure(
        &self,
        collection: &CollectionRef,
        id: &str,
        params: &[Value],
        _partition_key: Option<&PartitionKey>,
    ) -> Result<Value, ClientError> {
        self.count(|c| c.procedures_executed += 1);
        {
            let databases = self.databases.read().map_err(poisoned)?;
            let coll = collection_state(&databases, collection)?;
            if !coll.procedures.contains_key(id) {
                return Err(ClientError::NotFound {
                    kind: ResourceKind::StoredProcedure,
                    id: id.to_string(),
                });
            }
        }

        let handler = self
            .handlers
            .read()
            .map_err(poisoned)?
            .get(id)
            .cloned();
        Ok(match handler {
            Some(handler) => handler(params),
            None => Value::Array(params.to_vec()),
        })
    }
}

fn collection_state<'a>(
    databases: &'a BTreeMap<String, DatabaseState>,
    collection: &CollectionRef,
) -> Result<&'a CollectionState, ClientError> {
    databases
        .get(&collection.database_id)
        .and_then(|db| db.collections.get(&collection.id))
        .ok_or_else(|| ClientError::NotFound {
            kind: ResourceKind::Collection,
            id: collection.id.clone(),
        })
}

fn collection_state_mut<'a>(
    databases: &'a mut BTreeMap<String, DatabaseState>,
    collection: &CollectionRef,
) -> Result<&'a mut CollectionState, ClientError> {
    databases
        .get_mut(&collection.database_id)
        .and_then(|db| db.collections.get_mut(&collection.id))
        .ok_or_else(|| ClientError::NotFound {
            kind: ResourceKind::Collection,
            id: collection.id.clone(),
        })
}

/// Connector yielding a shared [`InMemoryClient`].
///
/// Clone it before handing it to a
/// [`ConnectionManager`](crate::ConnectionManager) to keep a handle on the
/// client (and its operation counters) from test code.
#[derive(Clone, Default)]
pub struct InMemoryConnector {
    client: Arc<InMemoryClient>,
    connects: Arc<AtomicUsize>,
}

impl InMemoryConnector {
    pub fn new(client: InMemoryClient) -> Self {
        Self {
            client: Arc::new(client),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The shared client this connector hands out.
    pub fn client(&self) -> &InMemoryClient {
        &self.client
    }

    /// How many times `connect` has been called.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connect for InMemoryConnector {
    async fn connect(
        &self,
        _settings: &DbSettings,
    ) -> Result<Arc<dyn DocumentStoreClient>, ConnectionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let client: Arc<dyn DocumentStoreClient> = self.client.clone();
        Ok(client)
    }
}
