//! Cursor scan implementation

use crate::error::{Error, Result};
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::debug;

type Retriever<C, R, Err> = Arc<dyn Fn(C) -> std::result::Result<R, Err> + Send + Sync>;
type NextCursor<C, R> = Arc<dyn Fn(&R) -> Option<C> + Send + Sync>;
type DataExtractor<R, T> = Arc<dyn Fn(R) -> Vec<T> + Send + Sync>;
type EndChecker<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

struct ScanConfig<T, C, R, Err> {
    start: C,
    retriever: Retriever<C, R, Err>,
    next_cursor: NextCursor<C, R>,
    extractor: DataExtractor<R, T>,
    end_checker: Option<EndChecker<C>>,
}

/// Reusable rolling scan definition
///
/// Every call to [`CursorScan::iter`] restarts from the initial cursor.
pub struct CursorScan<T, C, R, Err> {
    config: Arc<ScanConfig<T, C, R, Err>>,
}

impl<T, C, R, Err> CursorScan<T, C, R, Err> {
    /// Start building a scan
    pub fn builder() -> CursorScanBuilder<T, C, R, Err> {
        CursorScanBuilder::new()
    }
}

impl<T, C: Clone, R, Err> CursorScan<T, C, R, Err> {
    /// Start a new scan from the initial cursor
    pub fn iter(&self) -> ScanIter<T, C, R, Err> {
        ScanIter {
            cursor: Some(self.config.start.clone()),
            config: Arc::clone(&self.config),
            current: Vec::new().into_iter(),
            rounds: 0,
        }
    }
}

impl<T, C, R, Err> Clone for CursorScan<T, C, R, Err> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<T, C, R, Err> fmt::Debug for CursorScan<T, C, R, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorScan")
            .field("has_end_checker", &self.config.end_checker.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, C: Clone + PartialEq, R, Err> IntoIterator for &CursorScan<T, C, R, Err> {
    type Item = std::result::Result<T, Err>;
    type IntoIter = ScanIter<T, C, R, Err>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`CursorScan`]
pub struct CursorScanBuilder<T, C, R, Err> {
    start: Option<C>,
    retriever: Option<Retriever<C, R, Err>>,
    next_cursor: Option<NextCursor<C, R>>,
    extractor: Option<DataExtractor<R, T>>,
    end_checker: Option<EndChecker<C>>,
}

impl<T, C, R, Err> CursorScanBuilder<T, C, R, Err> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            start: None,
            retriever: None,
            next_cursor: None,
            extractor: None,
            end_checker: None,
        }
    }

    /// Set the cursor of the first retrieval
    #[must_use]
    pub fn start(mut self, cursor: C) -> Self {
        self.start = Some(cursor);
        self
    }

    /// Set how a response is retrieved for a cursor
    #[must_use]
    pub fn retriever(
        mut self,
        retriever: impl Fn(C) -> std::result::Result<R, Err> + Send + Sync + 'static,
    ) -> Self {
        self.retriever = Some(Arc::new(retriever));
        self
    }

    /// Set how the next cursor is read from a response; `None` ends the scan
    #[must_use]
    pub fn next_cursor(
        mut self,
        next_cursor: impl Fn(&R) -> Option<C> + Send + Sync + 'static,
    ) -> Self {
        self.next_cursor = Some(Arc::new(next_cursor));
        self
    }

    /// Set how entities are taken out of a response
    #[must_use]
    pub fn extractor(mut self, extractor: impl Fn(R) -> Vec<T> + Send + Sync + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Stop before retrieving any cursor this returns `true` for
    #[must_use]
    pub fn end_checker(mut self, end_checker: impl Fn(&C) -> bool + Send + Sync + 'static) -> Self {
        self.end_checker = Some(Arc::new(end_checker));
        self
    }

    /// Validate and freeze the scan
    pub fn build(self) -> Result<CursorScan<T, C, R, Err>> {
        let start = self.start.ok_or_else(|| Error::missing_field("start"))?;
        let retriever = self
            .retriever
            .ok_or_else(|| Error::missing_field("retriever"))?;
        let next_cursor = self
            .next_cursor
            .ok_or_else(|| Error::missing_field("next_cursor"))?;
        let extractor = self
            .extractor
            .ok_or_else(|| Error::missing_field("extractor"))?;

        Ok(CursorScan {
            config: Arc::new(ScanConfig {
                start,
                retriever,
                next_cursor,
                extractor,
                end_checker: self.end_checker,
            }),
        })
    }
}

impl<T, C, R, Err> Default for CursorScanBuilder<T, C, R, Err> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Iterator
// ============================================================================

/// One pass of a [`CursorScan`]
///
/// Empty responses are skipped as long as they advance the cursor. An empty
/// response that hands back the cursor it was retrieved with ends the scan.
pub struct ScanIter<T, C, R, Err> {
    config: Arc<ScanConfig<T, C, R, Err>>,
    cursor: Option<C>,
    current: std::vec::IntoIter<T>,
    rounds: usize,
}

impl<T, C, R, Err> ScanIter<T, C, R, Err> {
    /// Number of responses retrieved so far
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Check if no more responses will be retrieved
    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }
}

impl<T, C: Clone + PartialEq, R, Err> Iterator for ScanIter<T, C, R, Err> {
    type Item = std::result::Result<T, Err>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(Ok(item));
            }

            let cursor = self.cursor.take()?;
            if self
                .config
                .end_checker
                .as_ref()
                .is_some_and(|is_end| is_end(&cursor))
            {
                debug!("Scan reached end cursor after {} rounds", self.rounds);
                return None;
            }

            self.rounds += 1;
            let response = match (self.config.retriever)(cursor.clone()) {
                Ok(response) => response,
                Err(e) => return Some(Err(e)),
            };
            self.cursor = (self.config.next_cursor)(&response);
            self.current = (self.config.extractor)(response).into_iter();
            if self.current.as_slice().is_empty() && self.cursor.as_ref() == Some(&cursor) {
                debug!("Scan stalled on an empty response after {} rounds", self.rounds);
                self.cursor = None;
                return None;
            }
            if self.cursor.is_none() {
                debug!("Scan finished after {} rounds", self.rounds);
            }
        }
    }
}

impl<T, C: Clone + PartialEq, R, Err> FusedIterator for ScanIter<T, C, R, Err> {}

impl<T, C, R, Err> fmt::Debug for ScanIter<T, C, R, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanIter")
            .field("rounds", &self.rounds)
            .field("finished", &self.cursor.is_none())
            .field("buffered", &self.current.len())
            .finish()
    }
}
