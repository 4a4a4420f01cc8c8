//! DocumentQuery - Lazy, restartable enumeration of a filtered query.

use std::collections::VecDeque;

use serde::de::DeserializeOwned;

use crate::client::FeedOptions;

use super::{DocumentDb, DocumentError};

/// A lazy server-side query with a client-side typed predicate.
///
/// Construction performs no I/O; each call to [`next`](Self::next) drains an
/// internal buffer and fetches the next remote page when the buffer runs
/// dry. Enumeration is finite for a fixed store but unbounded if documents
/// keep being added ahead of the cursor. Result order is whatever the store
/// returns — no sort is imposed.
///
/// Documents that do not deserialize as `T` are skipped: collections hold
/// multiple document shapes side by side (discriminated by their `type`
/// field), and a query for one shape simply does not match the others.
pub struct DocumentQuery<'a, T, P> {
    db: &'a DocumentDb,
    predicate: P,
    feed: FeedOptions,
    buffered: VecDeque<T>,
    continuation: Option<String>,
    exhausted: bool,
}

impl<'a, T, P> DocumentQuery<'a, T, P>
where
    T: DeserializeOwned,
    P: Fn(&T) -> bool,
{
    pub(crate) fn new(db: &'a DocumentDb, predicate: P, feed: FeedOptions) -> Self {
        Self {
            db,
            predicate,
            feed,
            buffered: VecDeque::new(),
            continuation: None,
            exhausted: false,
        }
    }

    /// Fetch the next matching document, or `None` when the query is
    /// exhausted.
    pub async fn next(&mut self) -> Result<Option<T>, DocumentError> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Ok(Some(item));
            }
            if self.exhausted {
                return Ok(None);
            }

            let (client, collection) = self.db.resolve().await?;
            let page = client
                .query_documents(&collection, None, &self.feed, self.continuation.as_deref())
                .await?;
            self.continuation = page.continuation;
            if self.continuation.is_none() {
                self.exhausted = true;
            }

            for document in page.documents {
                if let Ok(item) = serde_json::from_value::<T>(document) {
                    if (self.predicate)(&item) {
                        self.buffered.push_back(item);
                    }
                }
            }
        }
    }

    /// Reset the cursor so the next [`next`](Self::next) call re-enumerates
    /// from the start, issuing fresh fetches.
    pub fn restart(&mut self) {
        self.buffered.clear();
        self.continuation = None;
        self.exhausted = false;
    }

    /// Drain the remaining matches into a `Vec`.
    pub async fn try_collect(mut self) -> Result<Vec<T>, DocumentError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }
}
