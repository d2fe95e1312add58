//! Fetch types and traits
//!
//! Defines the cursor-based fetch capability consumed by the scroller.

/// A data source that can be read in cursor order
///
/// `fetch(cursor, limit)` must return at most `limit` entities sorted by
/// cursor. When `cursor` is present and an entity with that cursor exists,
/// it is the first element returned (start-inclusive). A result shorter
/// than `limit` means there is no more data. An absent cursor reads from
/// the beginning of the source.
pub trait CursorSource<C, E>: Send + Sync {
    /// Failure raised by the source; propagated to callers unchanged
    type Error;

    /// Fetch up to `limit` entities starting at `cursor` (inclusive)
    fn fetch(&self, cursor: Option<C>, limit: usize) -> Result<Vec<E>, Self::Error>;
}

impl<C, E, Err, F> CursorSource<C, E> for F
where
    F: Fn(Option<C>, usize) -> Result<Vec<E>, Err> + Send + Sync,
{
    type Error = Err;

    fn fetch(&self, cursor: Option<C>, limit: usize) -> Result<Vec<E>, Err> {
        self(cursor, limit)
    }
}
