use std::fmt;

use crate::client::{ClientError, ResourceKind};
use crate::connection::ConnectionError;
use crate::provisioning::ProvisioningError;

/// Error type for document operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The underlying connection could not be established.
    Connection(ConnectionError),
    /// Lazy database/collection/trigger/procedure provisioning failed.
    Provisioning(ProvisioningError),
    /// The target of a get-then-act operation (update, delete) or a stored
    /// procedure invocation does not exist.
    NotFound { kind: ResourceKind, id: String },
    /// A create collided with an existing document of the same id and
    /// partition.
    Conflict { id: String },
    /// The item could not be serialized, or the response could not be
    /// deserialized into the requested type.
    Serde(String),
    /// Any other client-level failure.
    Client(ClientError),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Connection(err) => write!(f, "{}", err),
            DocumentError::Provisioning(err) => write!(f, "{}", err),
            DocumentError::NotFound { kind, id } => write!(f, "{} '{}' not found", kind, id),
            DocumentError::Conflict { id } => {
                write!(f, "document '{}' already exists in its partition", id)
            }
            DocumentError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            DocumentError::Client(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<ConnectionError> for DocumentError {
    fn from(err: ConnectionError) -> Self {
        DocumentError::Connection(err)
    }
}

impl From<ProvisioningError> for DocumentError {
    fn from(err: ProvisioningError) -> Self {
        DocumentError::Provisioning(err)
    }
}

impl From<ClientError> for DocumentError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Conflict {
                kind: ResourceKind::Document,
                id,
            } => DocumentError::Conflict { id },
            ClientError::NotFound { kind, id } => DocumentError::NotFound { kind, id },
            ClientError::Serde(msg) => DocumentError::Serde(msg),
            other => DocumentError::Client(other),
        }
    }
}
