use std::fmt;

/// Error type for connection establishment.
///
/// All variants are fatal for the calling path; the crate performs no
/// automatic retry. A later call to
/// [`ConnectionManager::client`](crate::ConnectionManager::client) attempts
/// construction again from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The configured endpoint is not a valid URL.
    InvalidEndpoint { url: String, reason: String },
    /// The configured authorization key is empty.
    MissingAuthorizationKey,
    /// The backend client could not be constructed (unreachable endpoint,
    /// rejected credentials, ...).
    Failed(String),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::InvalidEndpoint { url, reason } => {
                write!(f, "invalid endpoint url '{}': {}", url, reason)
            }
            ConnectionError::MissingAuthorizationKey => {
                write!(f, "authorization key is empty")
            }
            ConnectionError::Failed(msg) => write!(f, "connection failed: {}", msg),
        }
    }
}

impl std::error::Error for ConnectionError {}
