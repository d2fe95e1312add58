//! In-memory cursor source
//!
//! A key-ordered table that can be mutated while it is being scrolled.

use super::types::CursorSource;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Key-ordered in-memory table implementing [`CursorSource`]
///
/// Cloning yields another handle to the same table, so one handle can be
/// handed to a scroller while another deletes visited rows.
#[derive(Debug)]
pub struct MemorySource<K, E> {
    rows: Arc<RwLock<BTreeMap<K, E>>>,
    fetches: Arc<AtomicUsize>,
}

impl<K: Ord, E> MemorySource<K, E> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a table from records, keyed by `key_of`
    pub fn from_records<I, F>(records: I, key_of: F) -> Self
    where
        I: IntoIterator<Item = E>,
        F: Fn(&E) -> K,
    {
        let rows = records
            .into_iter()
            .map(|record| (key_of(&record), record))
            .collect();
        Self {
            rows: Arc::new(RwLock::new(rows)),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Insert or replace a row
    pub fn insert(&self, key: K, record: E) -> Option<E> {
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, record)
    }

    /// Delete a row
    pub fn remove(&self, key: &K) -> Option<E> {
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Check whether a row exists
    pub fn contains(&self, key: &K) -> bool {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fetch calls served so far, across all handles
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl<K: Ord, E> Default for MemorySource<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> Clone for MemorySource<K, E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            fetches: Arc::clone(&self.fetches),
        }
    }
}

impl<K, E> CursorSource<K, E> for MemorySource<K, E>
where
    K: Ord + Send + Sync,
    E: Clone + Send + Sync,
{
    type Error = Infallible;

    fn fetch(&self, cursor: Option<K>, limit: usize) -> Result<Vec<E>, Infallible> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let page = match cursor {
            Some(start) => rows
                .range(start..)
                .take(limit)
                .map(|(_, record)| record.clone())
                .collect(),
            None => rows.values().take(limit).cloned().collect(),
        };
        Ok(page)
    }
}
