//! Page scroller implementation
//!
//! Each traversal runs a small state machine:
//!
//! ```text
//! FirstFetch ──fetch──▶ Continuing ──fetch (full page)──▶ Continuing
//!      │                    │
//!      └──empty─────────────┴──short page / page cap──▶ Exhausted
//! ```

use super::builder::ScrollerBuilder;
use super::entities::Entities;
use super::types::{ScrollConfig, ScrollPhase};
use crate::types::{PageSize, TrimPolicy};
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::{debug, trace};

/// Lazy page-by-page view over a cursor source
///
/// Holds configuration only; cloning is cheap and every traversal started
/// from it is independent of the others.
pub struct PageScroller<C, E, Err> {
    config: Arc<ScrollConfig<C, E, Err>>,
}

impl<C, E, Err> PageScroller<C, E, Err> {
    /// Start building a scroller
    pub fn builder() -> ScrollerBuilder<C, E, Err> {
        ScrollerBuilder::new()
    }

    pub(crate) fn from_config(config: ScrollConfig<C, E, Err>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Configured trimming policy
    pub fn policy(&self) -> TrimPolicy {
        self.config.policy
    }

    /// Configured page cap, if any
    pub fn max_pages(&self) -> Option<usize> {
        self.config.max_pages
    }

    /// Configured page size
    pub fn page_size(&self) -> &PageSize {
        self.config.fetcher.page_size()
    }
}

impl<C: Clone, E, Err> PageScroller<C, E, Err> {
    /// Start a new traversal yielding whole pages
    pub fn pages(&self) -> Pages<C, E, Err> {
        Pages {
            cursor: self.config.start.clone(),
            config: Arc::clone(&self.config),
            page_index: 0,
            phase: ScrollPhase::FirstFetch,
        }
    }

    /// Start a new traversal yielding individual entities
    pub fn entities(&self) -> Entities<C, E, Err> {
        Entities::new(self.pages())
    }
}

impl<C, E, Err> Clone for PageScroller<C, E, Err> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<C, E, Err> fmt::Debug for PageScroller<C, E, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageScroller")
            .field("page_size", self.config.fetcher.page_size())
            .field("policy", &self.config.policy)
            .field("max_pages", &self.config.max_pages)
            .finish_non_exhaustive()
    }
}

impl<C: Clone, E, Err> IntoIterator for &PageScroller<C, E, Err> {
    type Item = Result<E, Err>;
    type IntoIter = Entities<C, E, Err>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities()
    }
}

impl<C: Clone, E, Err> IntoIterator for PageScroller<C, E, Err> {
    type Item = Result<E, Err>;
    type IntoIter = Entities<C, E, Err>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities()
    }
}

// ============================================================================
// Pages
// ============================================================================

/// One traversal of a [`PageScroller`], yielding non-empty pages
///
/// Each `next` call performs at most one fetch. A fetch error is yielded
/// once and the traversal then stops; resuming after an error is not
/// supported. A traversal is driven through `&mut self`, so it is never
/// advanced from two places at once.
pub struct Pages<C, E, Err> {
    config: Arc<ScrollConfig<C, E, Err>>,
    cursor: Option<C>,
    page_index: usize,
    phase: ScrollPhase,
}

impl<C, E, Err> Pages<C, E, Err> {
    /// Current phase of this traversal
    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    /// Number of fetch calls made so far
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    fn cap_reached(&self) -> bool {
        self.config
            .max_pages
            .is_some_and(|max| self.page_index >= max)
    }

    /// Record the outcome of a fetch and decide whether another may follow
    fn settle(&mut self, page: Vec<E>, has_more: bool) -> Option<Vec<E>> {
        if page.is_empty() {
            debug!("Scroll exhausted after {} fetches: empty page", self.page_index);
            self.phase = ScrollPhase::Exhausted;
            return None;
        }

        if !has_more {
            debug!("Scroll exhausted after {} fetches: short page", self.page_index);
            self.phase = ScrollPhase::Exhausted;
        } else if self.cap_reached() {
            debug!("Scroll stopped at page cap {}", self.page_index);
            self.phase = ScrollPhase::Exhausted;
        } else {
            self.phase = ScrollPhase::Continuing;
        }
        Some(page)
    }
}

impl<C: Clone, E, Err> Pages<C, E, Err> {
    /// Resume from the last yielded cursor and drop the overlapping head
    fn scroll_trim_first(&mut self) -> Result<Option<Vec<E>>, Err> {
        let limit = self.config.fetcher.next_page_size();
        let page = if self.phase == ScrollPhase::FirstFetch {
            self.config.fetcher.fetch(self.cursor.clone(), limit)?
        } else {
            let mut page = self
                .config
                .fetcher
                .fetch(self.cursor.clone(), limit.saturating_add(1))?;
            if !page.is_empty() {
                page.remove(0);
                trace!("Dropped leading element of page {}", self.page_index + 1);
            }
            page
        };
        self.page_index += 1;

        let has_more = page.len() >= limit;
        if has_more {
            if let Some(last) = page.last() {
                self.cursor = Some((self.config.cursor_of)(last));
            }
        }
        Ok(self.settle(page, has_more))
    }

    /// Over-fetch by one and hold the extra element back as the next cursor
    fn scroll_trim_last(&mut self) -> Result<Option<Vec<E>>, Err> {
        let limit = self.config.fetcher.next_page_size();
        let mut page = self
            .config
            .fetcher
            .fetch(self.cursor.clone(), limit.saturating_add(1))?;
        self.page_index += 1;

        let has_more = page.len() > limit;
        if has_more {
            if let Some(boundary) = page.pop() {
                self.cursor = Some((self.config.cursor_of)(&boundary));
                trace!("Held back boundary element of page {}", self.page_index);
            }
        }
        Ok(self.settle(page, has_more))
    }
}

impl<C: Clone, E, Err> Iterator for Pages<C, E, Err> {
    type Item = Result<Vec<E>, Err>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.phase.is_exhausted() {
            return None;
        }

        let step = match self.config.policy {
            TrimPolicy::TrimFirst => self.scroll_trim_first(),
            TrimPolicy::TrimLast => self.scroll_trim_last(),
        };
        match step {
            Ok(page) => page.map(Ok),
            Err(e) => {
                self.phase = ScrollPhase::Exhausted;
                Some(Err(e))
            }
        }
    }
}

impl<C: Clone, E, Err> FusedIterator for Pages<C, E, Err> {}

impl<C, E, Err> fmt::Debug for Pages<C, E, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pages")
            .field("page_index", &self.page_index)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
