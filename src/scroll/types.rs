//! Scroll types
//!
//! Frozen scroller configuration and the per-traversal phase.

use crate::fetch::PageFetcher;
use crate::types::TrimPolicy;
use std::sync::Arc;

/// Extracts the cursor value of an entity
pub(crate) type CursorFn<C, E> = Arc<dyn Fn(&E) -> C + Send + Sync>;

/// Where a traversal stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    /// Nothing fetched yet
    #[default]
    FirstFetch,
    /// At least one full page fetched, more may follow
    Continuing,
    /// End of data or page cap reached; terminal
    Exhausted,
}

impl ScrollPhase {
    /// Check if no further pages will be produced
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// Immutable configuration shared by every traversal of a scroller
pub(crate) struct ScrollConfig<C, E, Err> {
    pub fetcher: PageFetcher<C, E, Err>,
    pub start: Option<C>,
    pub cursor_of: CursorFn<C, E>,
    pub policy: TrimPolicy,
    pub max_pages: Option<usize>,
}
