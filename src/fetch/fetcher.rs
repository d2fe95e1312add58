//! Page fetcher
//!
//! Wraps a [`CursorSource`] together with the configured page size.

use super::types::CursorSource;
use crate::types::PageSize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Adapter between the scroller and a cursor source
///
/// Holds configuration only. The scroller asks for
/// [`PageFetcher::next_page_size`] and then fetches with whatever limit the
/// trimming policy needs.
pub struct PageFetcher<C, E, Err> {
    source: Arc<dyn CursorSource<C, E, Error = Err>>,
    page_size: PageSize,
}

impl<C, E, Err> PageFetcher<C, E, Err> {
    /// Create a new page fetcher
    pub fn new(source: Arc<dyn CursorSource<C, E, Error = Err>>, page_size: PageSize) -> Self {
        Self { source, page_size }
    }

    /// Configured page size
    pub fn page_size(&self) -> &PageSize {
        &self.page_size
    }

    /// Evaluate the page size for the next fetch
    pub fn next_page_size(&self) -> usize {
        self.page_size.resolve()
    }

    /// Fetch up to `limit` entities starting at `cursor`
    ///
    /// Sources that return more than `limit` entities are truncated.
    pub fn fetch(&self, cursor: Option<C>, limit: usize) -> Result<Vec<E>, Err> {
        debug!(
            "Fetching page: limit={}, from_start={}",
            limit,
            cursor.is_none()
        );
        let mut page = self.source.fetch(cursor, limit)?;
        if page.len() > limit {
            warn!(
                "Source returned {} entities for limit {}, truncating",
                page.len(),
                limit
            );
            page.truncate(limit);
        }
        debug!("Fetched {} entities", page.len());
        Ok(page)
    }
}

impl<C, E, Err> Clone for PageFetcher<C, E, Err> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            page_size: self.page_size.clone(),
        }
    }
}

impl<C, E, Err> fmt::Debug for PageFetcher<C, E, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFetcher")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
