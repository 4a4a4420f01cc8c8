//! Repositories - Typed facades over the generic accessor.
//!
//! A [`RepositoryBase`] pins the accessor's type parameter to one document
//! shape, giving each shape a narrow, type-safe API without re-implementing
//! connection or provisioning logic. New repositories reuse it by
//! composition:
//!
//! ```ignore
//! use docstore::{DocumentBase, RepositoryExt};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Order {
//!     id: String,
//!     #[serde(rename = "type")]
//!     doc_type: String,
//!     total: u32,
//! }
//!
//! impl DocumentBase for Order {
//!     fn id(&self) -> &str { &self.id }
//!     fn doc_type(&self) -> &str { &self.doc_type }
//! }
//!
//! let orders = db.repository::<Order>();
//! orders.create(&order, &RequestOptions::default()).await?;
//! let found = orders.get("order-1", &FeedOptions::default()).await?;
//! ```

mod base;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use base::{RepositoryBase, RepositoryExt};

/// Capability set a document shape must expose to be stored.
///
/// `id` is the unique document identifier within its partition; `doc_type`
/// is a read-only discriminator allowing multiple shapes to share one
/// collection (serialize it as the document's `type` field).
pub trait DocumentBase: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Unique identifier of this document.
    fn id(&self) -> &str;

    /// Shape discriminator for polymorphic storage.
    fn doc_type(&self) -> &str;
}
