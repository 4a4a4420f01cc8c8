//! RepositoryBase - One document shape bound to the accessor.

use std::marker::PhantomData;

use serde_json::Value;

use crate::client::{FeedOptions, RequestOptions};
use crate::db::{DocumentDb, DocumentError, DocumentQuery};

use super::DocumentBase;

/// Typed repository for documents of shape `T`.
///
/// Every method is a pass-through to the corresponding [`DocumentDb`] call,
/// restricted to `T`. Specialize per shape by wrapping this in a named
/// repository struct and delegating.
pub struct RepositoryBase<'a, T> {
    db: &'a DocumentDb,
    _marker: PhantomData<T>,
}

impl<'a, T: DocumentBase> RepositoryBase<'a, T> {
    pub fn new(db: &'a DocumentDb) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    /// The underlying accessor, for specialized repositories that need it.
    pub fn db(&self) -> &DocumentDb {
        self.db
    }

    /// Get an item by id as a typed id-filtered query. Returns `None` when
    /// absent.
    pub async fn get(&self, id: &str, feed: &FeedOptions) -> Result<Option<T>, DocumentError> {
        let id = id.to_string();
        let mut query = self
            .db
            .get_items::<T, _>(move |item| item.id() == id, feed.clone());
        query.next().await
    }

    /// All items of shape `T` matching a predicate, as a lazy query.
    pub fn get_items<P>(&self, predicate: P, feed: FeedOptions) -> DocumentQuery<'a, T, P>
    where
        P: Fn(&T) -> bool,
    {
        self.db.get_items(predicate, feed)
    }

    /// Create a new item.
    pub async fn create(
        &self,
        item: &T,
        options: &RequestOptions,
    ) -> Result<Value, DocumentError> {
        self.db.create(item, options).await
    }

    /// Replace the item with the given id.
    pub async fn update(
        &self,
        id: &str,
        item: &T,
        options: &RequestOptions,
    ) -> Result<Value, DocumentError> {
        self.db.update(id, item, options).await
    }

    /// Remove the item with the given id.
    pub async fn delete(&self, id: &str, options: &RequestOptions) -> Result<(), DocumentError> {
        self.db.delete(id, options).await
    }
}

/// Extension trait for typed repository access on a [`DocumentDb`].
pub trait RepositoryExt {
    /// Get a typed repository for document shape `T`.
    fn repository<T: DocumentBase>(&self) -> RepositoryBase<'_, T>;
}

impl RepositoryExt for DocumentDb {
    fn repository<T: DocumentBase>(&self) -> RepositoryBase<'_, T> {
        RepositoryBase::new(self)
    }
}
