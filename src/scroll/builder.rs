//! Scroller builder
//!
//! Collects configuration pieces in any order and validates them once in
//! [`ScrollerBuilder::build`].

use super::scroller::PageScroller;
use super::types::{CursorFn, ScrollConfig};
use crate::error::{Error, Result};
use crate::fetch::{CursorSource, PageFetcher};
use crate::types::{PageSize, TrimPolicy};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Builder for [`PageScroller`]
///
/// Defaults: page size [`DEFAULT_PAGE_SIZE`](crate::types::DEFAULT_PAGE_SIZE),
/// [`TrimPolicy::TrimFirst`], no start cursor and no page cap. New
/// integrations should ask for [`TrimPolicy::TrimLast`] explicitly.
pub struct ScrollerBuilder<C, E, Err> {
    source: Option<Arc<dyn CursorSource<C, E, Error = Err>>>,
    start: Option<C>,
    page_size: PageSize,
    cursor_of: Option<CursorFn<C, E>>,
    policy: TrimPolicy,
    max_pages: Option<usize>,
}

impl<C, E, Err> ScrollerBuilder<C, E, Err> {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self {
            source: None,
            start: None,
            page_size: PageSize::default(),
            cursor_of: None,
            policy: TrimPolicy::default(),
            max_pages: None,
        }
    }

    /// Set the data source
    #[must_use]
    pub fn source<S>(mut self, source: S) -> Self
    where
        S: CursorSource<C, E, Error = Err> + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Set the cursor of the first fetch (inclusive)
    #[must_use]
    pub fn start(mut self, cursor: C) -> Self {
        self.start = Some(cursor);
        self
    }

    /// Set the page size, fixed or dynamic
    #[must_use]
    pub fn page_size(mut self, page_size: impl Into<PageSize>) -> Self {
        self.page_size = page_size.into();
        self
    }

    /// Compute the page size before every fetch
    #[must_use]
    pub fn page_size_fn(mut self, supplier: impl Fn() -> usize + Send + Sync + 'static) -> Self {
        self.page_size = PageSize::dynamic(supplier);
        self
    }

    /// Set how an entity's cursor is read
    #[must_use]
    pub fn cursor_extractor(
        mut self,
        extractor: impl Fn(&E) -> C + Send + Sync + 'static,
    ) -> Self {
        self.cursor_of = Some(Arc::new(extractor));
        self
    }

    /// Set the trimming policy
    #[must_use]
    pub fn policy(mut self, policy: TrimPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stop after this many fetch calls
    ///
    /// A cap of 0 is rejected by [`build`](Self::build); every scroll makes at
    /// least one fetch.
    #[must_use]
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<PageScroller<C, E, Err>> {
        let source = self.source.ok_or_else(|| Error::missing_field("source"))?;
        let cursor_of = self
            .cursor_of
            .ok_or_else(|| Error::missing_field("cursor_extractor"))?;

        if self.page_size.fixed_value() == Some(0) {
            return Err(Error::invalid_value("page_size", "must be positive, got 0"));
        }
        if self.max_pages == Some(0) {
            return Err(Error::invalid_value("max_pages", "must be positive, got 0"));
        }
        if !self.policy.is_mutation_safe() {
            warn!(
                "Scroller uses {}; deleting visited entities during iteration can skip records",
                self.policy
            );
        }

        Ok(PageScroller::from_config(ScrollConfig {
            fetcher: PageFetcher::new(source, self.page_size),
            start: self.start,
            cursor_of,
            policy: self.policy,
            max_pages: self.max_pages,
        }))
    }
}

impl<C, E, Err> Default for ScrollerBuilder<C, E, Err> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E, Err> fmt::Debug for ScrollerBuilder<C, E, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollerBuilder")
            .field("has_source", &self.source.is_some())
            .field("has_start", &self.start.is_some())
            .field("page_size", &self.page_size)
            .field("has_cursor_extractor", &self.cursor_of.is_some())
            .field("policy", &self.policy)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}
