//! Entity iterator
//!
//! Flattens a page traversal into individual entities.

use super::scroller::Pages;
use super::types::ScrollPhase;
use std::fmt;
use std::iter::FusedIterator;

/// One traversal of a scroller, yielding entities in cursor order
///
/// The next page is fetched only once the buffered one is used up, so
/// dropping the iterator early never triggers another fetch.
pub struct Entities<C, E, Err> {
    pages: Pages<C, E, Err>,
    current: std::vec::IntoIter<E>,
}

impl<C, E, Err> Entities<C, E, Err> {
    pub(crate) fn new(pages: Pages<C, E, Err>) -> Self {
        Self {
            pages,
            current: Vec::new().into_iter(),
        }
    }

    /// Number of fetch calls made so far
    pub fn pages_fetched(&self) -> usize {
        self.pages.page_index()
    }

    /// Phase of the underlying page traversal
    pub fn phase(&self) -> ScrollPhase {
        self.pages.phase()
    }

    /// Entities already fetched but not yet yielded
    pub fn buffered(&self) -> usize {
        self.current.len()
    }
}

impl<C: Clone, E, Err> Iterator for Entities<C, E, Err> {
    type Item = Result<E, Err>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entity) = self.current.next() {
                return Some(Ok(entity));
            }
            match self.pages.next()? {
                Ok(page) => self.current = page.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let buffered = self.current.len();
        if self.pages.phase().is_exhausted() {
            (buffered, Some(buffered))
        } else {
            (buffered, None)
        }
    }
}

impl<C: Clone, E, Err> FusedIterator for Entities<C, E, Err> {}

impl<C, E, Err> fmt::Debug for Entities<C, E, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entities")
            .field("pages", &self.pages)
            .field("buffered", &self.current.len())
            .finish()
    }
}
