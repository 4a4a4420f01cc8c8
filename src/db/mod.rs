//! DocumentDb - Generic CRUD accessor over the provisioned collection.
//!
//! The accessor translates CRUD intents into client round trips. It resolves
//! its database and collection lazily, exactly once: the first operation
//! triggers read-or-create provisioning of the database, the collection, and
//! any configured triggers and stored procedures, and the resolved
//! collection handle is cached for the life of the accessor. Concurrent
//! first callers are serialized so provisioning never runs twice; a failed
//! resolution caches nothing and the next operation retries it.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docstore::{ConnectionManager, DocumentDb, FeedOptions, RequestOptions};
//!
//! let db = DocumentDb::new(Arc::new(manager));
//! db.create(&order, &RequestOptions::default()).await?;
//! let found = db.get("order-1", &FeedOptions::default()).await?;
//! ```

mod error;
mod query;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::client::{
    CollectionRef, DocumentStoreClient, FeedOptions, PartitionKey, RequestOptions, ResourceKind,
};
use crate::connection::ConnectionManager;
use crate::provisioning;
use crate::settings::{StoredProcedureDefinition, TriggerDefinition};

pub use error::DocumentError;
pub use query::DocumentQuery;

/// Generic document CRUD over a lazily provisioned collection.
pub struct DocumentDb {
    connection: Arc<ConnectionManager>,
    triggers: Vec<TriggerDefinition>,
    stored_procedures: Vec<StoredProcedureDefinition>,
    collection: OnceCell<CollectionRef>,
}

impl DocumentDb {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self {
            connection,
            triggers: Vec::new(),
            stored_procedures: Vec::new(),
            collection: OnceCell::new(),
        }
    }

    /// Triggers to provision during the first lazy resolution. Builder
    /// pattern — returns `self` for chaining.
    pub fn with_triggers(mut self, triggers: Vec<TriggerDefinition>) -> Self {
        self.triggers = triggers;
        self
    }

    /// Stored procedures to provision during the first lazy resolution.
    pub fn with_stored_procedures(mut self, procedures: Vec<StoredProcedureDefinition>) -> Self {
        self.stored_procedures = procedures;
        self
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    /// Resolve the client and provisioned collection, provisioning on first
    /// use.
    pub(crate) async fn resolve(
        &self,
    ) -> Result<(Arc<dyn DocumentStoreClient>, CollectionRef), DocumentError> {
        let client = self.connection.client().await?;
        let collection = self
            .collection
            .get_or_try_init(|| async {
                let settings = self.connection.settings();
                let database =
                    provisioning::ensure_database(client.as_ref(), &settings.database_id).await?;
                let collection = provisioning::ensure_collection(
                    client.as_ref(),
                    &database,
                    &settings.collection_id,
                    &settings.offer_type,
                )
                .await?;
                provisioning::ensure_triggers(client.as_ref(), &collection, &self.triggers)
                    .await?;
                provisioning::ensure_stored_procedures(
                    client.as_ref(),
                    &collection,
                    &self.stored_procedures,
                )
                .await?;
                Ok::<_, DocumentError>(collection)
            })
            .await?;
        Ok((client, collection.clone()))
    }

    /// Get a raw document by id. Returns `None` when absent — "not found"
    /// is a normal empty read, not an error.
    ///
    /// Supply the partition key in `feed` on partitioned collections;
    /// without it the lookup scans every partition.
    pub async fn get(
        &self,
        id: &str,
        feed: &FeedOptions,
    ) -> Result<Option<Value>, DocumentError> {
        let (client, collection) = self.resolve().await?;
        let mut continuation: Option<String> = None;
        loop {
            let page = client
                .query_documents(&collection, Some(id), feed, continuation.as_deref())
                .await?;
            if let Some(document) = page.documents.into_iter().next() {
                return Ok(Some(document));
            }
            match page.continuation {
                // Stores may return empty pages mid-query; keep walking.
                Some(next) => continuation = Some(next),
                None => return Ok(None),
            }
        }
    }

    /// Build a lazy, restartable query for documents of shape `T` matching
    /// `predicate`. No I/O happens until the query is first polled.
    pub fn get_items<T, P>(&self, predicate: P, feed: FeedOptions) -> DocumentQuery<'_, T, P>
    where
        T: DeserializeOwned,
        P: Fn(&T) -> bool,
    {
        DocumentQuery::new(self, predicate, feed)
    }

    /// Insert an item. Fails with [`DocumentError::Conflict`] when a
    /// document with the same id already exists in the target partition.
    pub async fn create<T: Serialize>(
        &self,
        item: &T,
        options: &RequestOptions,
    ) -> Result<Value, DocumentError> {
        let (client, collection) = self.resolve().await?;
        let document = to_document(item)?;
        Ok(client.create_document(&collection, document, options).await?)
    }

    /// Replace the document with the given id wholesale.
    ///
    /// Two round trips: a get resolves the existing document, then the
    /// replace is issued. Fails with [`DocumentError::NotFound`] when no
    /// prior document exists. Concurrent updates to the same id are not
    /// serialized by this layer.
    pub async fn update<T: Serialize>(
        &self,
        id: &str,
        item: &T,
        options: &RequestOptions,
    ) -> Result<Value, DocumentError> {
        let (client, collection) = self.resolve().await?;
        self.require(id, options).await?;
        let document = to_document(item)?;
        Ok(client
            .replace_document(&collection, id, document, options)
            .await?)
    }

    /// Delete the document with the given id. Same get-then-act pattern and
    /// `NotFound` behavior as [`update`](Self::update).
    pub async fn delete(&self, id: &str, options: &RequestOptions) -> Result<(), DocumentError> {
        let (client, collection) = self.resolve().await?;
        self.require(id, options).await?;
        Ok(client.delete_document(&collection, id, options).await?)
    }

    /// Execute a stored procedure by id with positional JSON parameters.
    ///
    /// The procedure reference is resolved first; an unregistered id fails
    /// with [`DocumentError::NotFound`]. Parameter arity and types are not
    /// validated — the procedure sees them as-is.
    pub async fn execute_stored_procedure<T: DeserializeOwned>(
        &self,
        procedure_id: &str,
        params: &[Value],
        partition_key: Option<&PartitionKey>,
    ) -> Result<T, DocumentError> {
        let (client, collection) = self.resolve().await?;
        if client
            .query_stored_procedure(&collection, procedure_id)
            .await?
            .is_none()
        {
            return Err(DocumentError::NotFound {
                kind: ResourceKind::StoredProcedure,
                id: procedure_id.to_string(),
            });
        }
        let result = client
            .execute_stored_procedure(&collection, procedure_id, params, partition_key)
            .await?;
        serde_json::from_value(result).map_err(|e| DocumentError::Serde(e.to_string()))
    }

    async fn require(&self, id: &str, options: &RequestOptions) -> Result<(), DocumentError> {
        let feed = FeedOptions {
            max_item_count: Some(1),
            partition_key: options.partition_key.clone(),
        };
        match self.get(id, &feed).await? {
            Some(_) => Ok(()),
            None => Err(DocumentError::NotFound {
                kind: ResourceKind::Document,
                id: id.to_string(),
            }),
        }
    }
}

fn to_document<T: Serialize>(item: &T) -> Result<Value, DocumentError> {
    serde_json::to_value(item).map_err(|e| DocumentError::Serde(e.to_string()))
}
