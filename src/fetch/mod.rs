//! Fetch module
//!
//! The leaf layer of the scroller: a thin adapter around an externally
//! supplied "fetch next batch starting at X, limit N" capability.
//!
//! # Overview
//!
//! - `CursorSource` - the fetch capability (closures implement it directly)
//! - `PageFetcher` - resolves the page size per call and invokes the source
//! - `MemorySource` - an in-memory, key-ordered table with deletion

mod fetcher;
mod memory;
mod types;

pub use fetcher::PageFetcher;
pub use memory::MemorySource;
pub use types::CursorSource;
