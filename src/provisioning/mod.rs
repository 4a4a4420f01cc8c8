//! Provisioning - Idempotent read-or-create for remote resources.
//!
//! Each `ensure_*` function queries for the resource by id and creates it
//! only when absent; existing resources are never modified or deleted. For
//! triggers and stored procedures, presence of an id-matching entry counts
//! as "already provisioned" even when the remote body differs from the
//! supplied definition — bodies are never diffed, so a changed definition is
//! not pushed (known staleness risk, see the definition types in
//! [`settings`](crate::settings)).
//!
//! The read-then-create sequence is not atomic across processes. When two
//! processes race to provision the same resource, the loser's create comes
//! back as a remote conflict and surfaces as [`ProvisioningError::Conflict`].

use std::fmt;

use crate::client::{
    ClientError, CollectionRef, DatabaseRef, DocumentStoreClient, ResourceKind,
};
use crate::settings::{StoredProcedureDefinition, TriggerDefinition};

/// Error type for provisioning operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    /// A concurrent provisioner created the resource between our existence
    /// check and our create call.
    Conflict { kind: ResourceKind, id: String },
    /// Any other client failure during provisioning.
    Client(ClientError),
}

impl fmt::Display for ProvisioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningError::Conflict { kind, id } => {
                write!(f, "concurrent provisioning of {} '{}'", kind, id)
            }
            ProvisioningError::Client(err) => write!(f, "provisioning failed: {}", err),
        }
    }
}

impl std::error::Error for ProvisioningError {}

impl From<ClientError> for ProvisioningError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Conflict { kind, id } => ProvisioningError::Conflict { kind, id },
            other => ProvisioningError::Client(other),
        }
    }
}

/// Use the database if it exists, otherwise create it.
pub async fn ensure_database(
    client: &dyn DocumentStoreClient,
    database_id: &str,
) -> Result<DatabaseRef, ProvisioningError> {
    if let Some(database) = client.query_database(database_id).await? {
        tracing::debug!(id = database_id, "database already provisioned");
        return Ok(database);
    }
    tracing::debug!(id = database_id, "creating database");
    Ok(client.create_database(database_id).await?)
}

/// Use the collection if it exists, otherwise create it.
///
/// `offer_type` is passed only on the create path; it is ignored for an
/// existing collection.
pub async fn ensure_collection(
    client: &dyn DocumentStoreClient,
    database: &DatabaseRef,
    collection_id: &str,
    offer_type: &str,
) -> Result<CollectionRef, ProvisioningError> {
    if let Some(collection) = client.query_collection(database, collection_id).await? {
        tracing::debug!(id = collection_id, "collection already provisioned");
        return Ok(collection);
    }
    tracing::debug!(id = collection_id, offer_type, "creating collection");
    Ok(client
        .create_collection(database, collection_id, offer_type)
        .await?)
}

/// Create each trigger that does not already exist, by id. No-op for an
/// empty list.
pub async fn ensure_triggers(
    client: &dyn DocumentStoreClient,
    collection: &CollectionRef,
    triggers: &[TriggerDefinition],
) -> Result<(), ProvisioningError> {
    for trigger in triggers {
        if client.query_trigger(collection, &trigger.id).await?.is_some() {
            tracing::debug!(id = %trigger.id, "trigger already provisioned");
            continue;
        }
        tracing::debug!(id = %trigger.id, "creating trigger");
        client.create_trigger(collection, trigger).await?;
    }
    Ok(())
}

/// Create each stored procedure that does not already exist, by id. No-op
/// for an empty list.
pub async fn ensure_stored_procedures(
    client: &dyn DocumentStoreClient,
    collection: &CollectionRef,
    procedures: &[StoredProcedureDefinition],
) -> Result<(), ProvisioningError> {
    for procedure in procedures {
        if client
            .query_stored_procedure(collection, &procedure.id)
            .await?
            .is_some()
        {
            tracing::debug!(id = %procedure.id, "stored procedure already provisioned");
            continue;
        }
        tracing::debug!(id = %procedure.id, "creating stored procedure");
        client.create_stored_procedure(collection, procedure).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryClient;
    use crate::settings::{TriggerOperation, TriggerType};

    #[tokio::test]
    async fn ensure_database_is_idempotent() {
        let client = InMemoryClient::new();

        let first = ensure_database(&client, "orders").await.unwrap();
        let second = ensure_database(&client, "orders").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.op_counts().databases_created, 1);
    }

    #[tokio::test]
    async fn ensure_collection_is_idempotent_and_applies_offer_on_create() {
        let client = InMemoryClient::new();
        let database = ensure_database(&client, "orders").await.unwrap();

        let first = ensure_collection(&client, &database, "items", "S1")
            .await
            .unwrap();
        // A different offer type on the second call must not touch the
        // existing collection.
        let second = ensure_collection(&client, &database, "items", "S3")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(client.op_counts().collections_created, 1);
        assert_eq!(client.collection_offer_type(&first).unwrap(), "S1");
    }

    #[tokio::test]
    async fn ensure_triggers_never_duplicates() {
        let client = InMemoryClient::new();
        let database = ensure_database(&client, "orders").await.unwrap();
        let collection = ensure_collection(&client, &database, "items", "S1")
            .await
            .unwrap();
        let triggers = vec![
            TriggerDefinition::new("audit", "function() {}", TriggerType::Pre, TriggerOperation::All),
            TriggerDefinition::new("stamp", "function() {}", TriggerType::Post, TriggerOperation::Create),
        ];

        ensure_triggers(&client, &collection, &triggers).await.unwrap();
        ensure_triggers(&client, &collection, &triggers).await.unwrap();

        assert_eq!(client.op_counts().triggers_created, 2);
    }

    #[tokio::test]
    async fn ensure_triggers_leaves_changed_bodies_alone() {
        let client = InMemoryClient::new();
        let database = ensure_database(&client, "orders").await.unwrap();
        let collection = ensure_collection(&client, &database, "items", "S1")
            .await
            .unwrap();

        let original =
            TriggerDefinition::new("audit", "v1", TriggerType::Pre, TriggerOperation::All);
        ensure_triggers(&client, &collection, std::slice::from_ref(&original))
            .await
            .unwrap();

        let changed =
            TriggerDefinition::new("audit", "v2", TriggerType::Pre, TriggerOperation::All);
        ensure_triggers(&client, &collection, std::slice::from_ref(&changed))
            .await
            .unwrap();

        // Presence-by-id only: the remote body stays at v1.
        let remote = client.query_trigger(&collection, "audit").await.unwrap().unwrap();
        assert_eq!(remote.body, "v1");
    }

    #[tokio::test]
    async fn ensure_stored_procedures_never_duplicates() {
        let client = InMemoryClient::new();
        let database = ensure_database(&client, "orders").await.unwrap();
        let collection = ensure_collection(&client, &database, "items", "S1")
            .await
            .unwrap();
        let procedures = vec![StoredProcedureDefinition::new("bulk_import", "function() {}")];

        ensure_stored_procedures(&client, &collection, &procedures)
            .await
            .unwrap();
        ensure_stored_procedures(&client, &collection, &procedures)
            .await
            .unwrap();

        assert_eq!(client.op_counts().procedures_created, 1);
    }

    #[tokio::test]
    async fn empty_definition_lists_are_no_ops() {
        let client = InMemoryClient::new();
        let database = ensure_database(&client, "orders").await.unwrap();
        let collection = ensure_collection(&client, &database, "items", "S1")
            .await
            .unwrap();

        ensure_triggers(&client, &collection, &[]).await.unwrap();
        ensure_stored_procedures(&client, &collection, &[]).await.unwrap();

        let counts = client.op_counts();
        assert_eq!(counts.triggers_queried, 0);
        assert_eq!(counts.procedures_queried, 0);
    }

    #[tokio::test]
    async fn losing_a_create_race_surfaces_as_conflict() {
        use async_trait::async_trait;
        use serde_json::Value;

        use crate::client::{DocumentPage, FeedOptions, PartitionKey, RequestOptions};

        /// Reads stale existence data: queries report the database absent
        /// while the backing store already has it, as happens when another
        /// process creates it between our check and our create.
        struct StaleReadClient {
            inner: InMemoryClient,
        }

        #[async_trait]
        impl DocumentStoreClient for StaleReadClient {
            async fn query_database(
                &self,
                _id: &str,
            ) -> Result<Option<DatabaseRef>, ClientError> {
                Ok(None)
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

        let inner = InMemoryClient::new();
        // Another process already created the database.
        inner.create_database("orders").await.unwrap();
        let client = StaleReadClient { inner };

        let err = ensure_database(&client, "orders").await.unwrap_err();
        assert!(matches!(
            err,
            ProvisioningError::Conflict {
                kind: ResourceKind::Database,
                ..
            }
        ));
    }
}
