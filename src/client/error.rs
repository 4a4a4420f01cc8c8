use std::fmt;

/// The kind of remote resource an operation addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Database,
    Collection,
    Document,
    Trigger,
    StoredProcedure,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Database => "database",
            ResourceKind::Collection => "collection",
            ResourceKind::Document => "document",
            ResourceKind::Trigger => "trigger",
            ResourceKind::StoredProcedure => "stored procedure",
        };
        write!(f, "{}", name)
    }
}

/// Error type for raw document store client operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A create collided with an existing resource of the same id (and
    /// partition, for documents).
    Conflict { kind: ResourceKind, id: String },
    /// The addressed resource does not exist.
    NotFound { kind: ResourceKind, id: String },
    /// Payload could not be serialized or deserialized.
    Serde(String),
    /// Network-level or store-internal failure.
    Transport(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Conflict { kind, id } => {
                write!(f, "{} '{}' already exists", kind, id)
            }
            ClientError::NotFound { kind, id } => {
                write!(f, "{} '{}' not found", kind, id)
            }
            ClientError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            ClientError::Transport(msg) => write!(f, "document store transport error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}
