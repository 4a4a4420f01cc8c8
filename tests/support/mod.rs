#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use docstore::{
    ClientError, CollectionRef, Connect, ConnectionError, ConnectionManager, DatabaseRef,
    DbSettings, DocumentBase, DocumentDb, DocumentPage, DocumentStoreClient, FeedOptions,
    InMemoryClient, InMemoryConnector, PartitionKey, RequestOptions, StoredProcedureDefinition,
    TriggerDefinition,
};

pub fn settings() -> DbSettings {
    DbSettings {
        endpoint_url: "https://example.documents.test:443/".into(),
        authorization_key: "key==".into(),
        database_id: "orders".into(),
        collection_id: "items".into(),
        offer_type: "S1".into(),
    }
}

/// A fresh accessor over an in-memory backend, plus the connector so tests
/// can reach the shared client and its operation counters.
pub fn harness() -> (DocumentDb, InMemoryConnector) {
    harness_with_client(InMemoryClient::new())
}

pub fn harness_with_client(client: InMemoryClient) -> (DocumentDb, InMemoryConnector) {
    let connector = InMemoryConnector::new(client);
    let manager = Arc::new(ConnectionManager::new(settings(), connector.clone()));
    (DocumentDb::new(manager), connector)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub total: u32,
}

impl Order {
    pub fn new(id: impl Into<String>, total: u32) -> Self {
        Self {
            id: id.into(),
            doc_type: "Order".into(),
            total,
        }
    }
}

impl DocumentBase for Order {
    fn id(&self) -> &str {
        &self.id
    }

    fn doc_type(&self) -> &str {
        &self.doc_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub amount: u32,
}

impl Invoice {
    pub fn new(id: impl Into<String>, amount: u32) -> Self {
        Self {
            id: id.into(),
            doc_type: "Invoice".into(),
            amount,
        }
    }
}

impl DocumentBase for Invoice {
    fn id(&self) -> &str {
        &self.id
    }

    fn doc_type(&self) -> &str {
        &self.doc_type
    }
}

/// A backend whose next `failures` database queries fail with a transport
/// error before it starts behaving like the wrapped in-memory store. Used
/// to exercise error paths during lazy provisioning.
pub struct UnstableClient {
    inner: InMemoryClient,
    failures_left: AtomicUsize,
}

impl UnstableClient {
    pub fn new(inner: InMemoryClient, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl DocumentStoreClient for UnstableClient {
    async fn query_database(&self, id: &str) -> Result<Option<DatabaseRef>, ClientError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok();
        if failing {
            return Err(ClientError::Transport("endpoint unreachable".into()));
        }
        self.inner.query_database(id).await
    }

    async fn create_database(&self, id: &str) -> Result<DatabaseRef, ClientError> {
        self.inner.create_database(id).await
    }

    async fn query_collection(
        &self,
        database: &DatabaseRef,
        id: &str,
    ) -> Result<Option<CollectionRef>, ClientError> {
        self.inner.query_collection(database, id).await
    }

    async fn create_collection(
        &self,
        database: &DatabaseRef,
        id: &str,
        offer_type: &str,
    ) -> Result<CollectionRef, ClientError> {
        self.inner.create_collection(database, id, offer_type).await
    }

    async fn query_documents(
        &self,
        collection: &CollectionRef,
        filter_id: Option<&str>,
        feed: &FeedOptions,
        continuation: Option<&str>,
    ) -> Result<DocumentPage, ClientError> {
        self.inner
            .query_documents(collection, filter_id, feed, continuation)
            .await
    }

    async fn create_document(
        &self,
        collection: &CollectionRef,
        document: Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        self.inner.create_document(collection, document, options).await
    }

    async fn replace_document(
        &self,
        collection: &CollectionRef,
        id: &str,
        document: Value,
        options: &RequestOptions,
    ) -> Result<Value, ClientError> {
        self.inner
            .replace_document(collection, id, document, options)
            .await
    }

    async fn delete_document(
        &self,
        collection: &CollectionRef,
        id: &str,
        options: &RequestOptions,
    ) -> Result<(), ClientError> {
        self.inner.delete_document(collection, id, options).await
    }

    async fn query_trigger(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<TriggerDefinition>, ClientError> {
        self.inner.query_trigger(collection, id).await
    }

    async fn create_trigger(
        &self,
        collection: &CollectionRef,
        trigger: &TriggerDefinition,
    ) -> Result<(), ClientError> {
        self.inner.create_trigger(collection, trigger).await
    }

    async fn query_stored_procedure(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<StoredProcedureDefinition>, ClientError> {
        self.inner.query_stored_procedure(collection, id).await
    }

    async fn create_stored_procedure(
        &self,
        collection: &CollectionRef,
        procedure: &StoredProcedureDefinition,
    ) -> Result<(), ClientError> {
        self.inner.create_stored_procedure(collection, procedure).await
    }

    async fn execute_stored_procedure(
        &self,
        collection: &CollectionRef,
        id: &str,
        params: &[Value],
        partition_key: Option<&PartitionKey>,
    ) -> Result<Value, ClientError> {
        self.inner
            .execute_stored_procedure(collection, id, params, partition_key)
            .await
    }
}

/// Connector yielding a shared [`UnstableClient`].
#[derive(Clone)]
pub struct UnstableConnector {
    client: Arc<UnstableClient>,
}

impl UnstableConnector {
    pub fn new(client: Arc<UnstableClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Connect for UnstableConnector {
    async fn connect(
        &self,
        _settings: &DbSettings,
    ) -> Result<Arc<dyn DocumentStoreClient>, ConnectionError> {
        let client: Arc<dyn DocumentStoreClient> = self.client.clone();
        Ok(client)
    }
}
