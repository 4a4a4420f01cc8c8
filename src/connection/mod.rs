//! Connection - Lazy, process-wide client construction.
//!
//! A [`ConnectionManager`] owns the settings and a [`Connect`] implementation
//! and builds the underlying [`DocumentStoreClient`] exactly once, on first
//! use. The handle is shared by reference afterwards and lives for the rest
//! of the process; it is never rebuilt or closed. Callers receive the
//! manager by explicit injection (typically wrapped in an `Arc`), never via
//! ambient lookup.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docstore::{ConnectionManager, DbSettings, InMemoryClient, InMemoryConnector};
//!
//! let connector = InMemoryConnector::new(InMemoryClient::new());
//! let manager = Arc::new(ConnectionManager::new(settings, connector));
//! let client = manager.client().await?;
//! ```

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use url::Url;

use crate::client::DocumentStoreClient;
use crate::settings::DbSettings;

pub use error::ConnectionError;

/// Builds a live [`DocumentStoreClient`] from settings.
///
/// The seam for dependency injection: production code supplies a connector
/// for the real wire client, tests supply
/// [`InMemoryConnector`](crate::InMemoryConnector).
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(
        &self,
        settings: &DbSettings,
    ) -> Result<Arc<dyn DocumentStoreClient>, ConnectionError>;
}

/// Owns the single reusable client handle for a document store.
///
/// The first call to [`client`](Self::client) validates the settings and
/// invokes the connector; concurrent first callers are serialized so exactly
/// one client is ever constructed. A failed attempt caches nothing — the
/// next call retries from scratch. Settings are fixed at construction;
/// callers must not expect a second manager with different settings to share
/// state with this one.
pub struct ConnectionManager {
    settings: DbSettings,
    connector: Box<dyn Connect>,
    client: OnceCell<Arc<dyn DocumentStoreClient>>,
}

impl ConnectionManager {
    pub fn new(settings: DbSettings, connector: impl Connect + 'static) -> Self {
        Self {
            settings,
            connector: Box::new(connector),
            client: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &DbSettings {
        &self.settings
    }

    /// Get the shared client, constructing it on first use.
    pub async fn client(&self) -> Result<Arc<dyn DocumentStoreClient>, ConnectionError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                validate(&self.settings)?;
                tracing::info!(
                    endpoint = %self.settings.endpoint_url,
                    database = %self.settings.database_id,
                    "establishing document store connection"
                );
                self.connector.connect(&self.settings).await
            })
            .await?;
        Ok(Arc::clone(client))
    }
}

fn validate(settings: &DbSettings) -> Result<(), ConnectionError> {
    Url::parse(&settings.endpoint_url).map_err(|e| ConnectionError::InvalidEndpoint {
        url: settings.endpoint_url.clone(),
        reason: e.to_string(),
    })?;
    if settings.authorization_key.trim().is_empty() {
        return Err(ConnectionError::MissingAuthorizationKey);
    }
    Ok(())
}
