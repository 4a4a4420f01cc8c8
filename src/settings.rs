//! Settings - Connection and provisioning configuration.
//!
//! `DbSettings` is supplied once at process start and treated as immutable.
//! Trigger and stored-procedure definitions are optional collections handed
//! to [`DocumentDb`](crate::DocumentDb) at construction; they are provisioned
//! remotely on first use.

use serde::{Deserialize, Serialize};

/// Connection and provisioning configuration for a document store.
///
/// `offer_type` is a throughput hint consumed only when the collection is
/// created; it is ignored when the collection already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSettings {
    pub endpoint_url: String,
    pub authorization_key: String,
    pub database_id: String,
    pub collection_id: String,
    pub offer_type: String,
}

/// When a trigger fires relative to the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerType {
    Pre,
    Post,
}

/// Which document operations a trigger applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerOperation {
    All,
    Create,
    Replace,
    Delete,
}

/// A named server-side trigger definition.
///
/// Provisioning is idempotent by id only: an already-existing trigger with
/// the same id is left untouched even when its body differs, so a changed
/// body is NOT pushed to the store. Delete the remote trigger to refresh it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    pub id: String,
    pub body: String,
    pub trigger_type: TriggerType,
    pub trigger_operation: TriggerOperation,
}

impl TriggerDefinition {
    pub fn new(
        id: impl Into<String>,
        body: impl Into<String>,
        trigger_type: TriggerType,
        trigger_operation: TriggerOperation,
    ) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            trigger_type,
            trigger_operation,
        }
    }
}

/// A named server-side stored procedure definition.
///
/// Same staleness caveat as [`TriggerDefinition`]: presence is checked by id
/// only, bodies are never diffed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProcedureDefinition {
    pub id: String,
    pub body: String,
}

impl StoredProcedureDefinition {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }
}
