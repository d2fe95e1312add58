// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # pagescroll
//!
//! Lazy iteration over data sources that only offer a cursor-based
//! "fetch the next batch starting at X, limit N" call: paginated APIs,
//! id-ordered table scans and similar.
//!
//! ## Features
//!
//! - **Page scrolling**: one forward-only sequence out of repeated bounded fetches
//! - **Two trimming policies**: legacy trim-first and the deletion-safe trim-last
//! - **Page cap**: hard stop after a number of fetch calls
//! - **Dynamic page size**: page size re-evaluated before every fetch
//! - **Rolling scans**: for sources whose responses carry the next cursor
//!
//! ## Quick Start
//!
//! ```rust
//! use pagescroll::{MemorySource, PageScroller, TrimPolicy};
//!
//! let users = MemorySource::from_records(1..=100u64, |id| *id);
//!
//! let scroller = PageScroller::builder()
//!     .source(users.clone())
//!     .cursor_extractor(|id: &u64| *id)
//!     .page_size(10)
//!     .policy(TrimPolicy::TrimLast)
//!     .build()?;
//!
//! // Visit and delete; trim-last never skips a row
//! let mut visited = 0;
//! for id in &scroller {
//!     let id = id.unwrap_or_else(|never| match never {});
//!     users.remove(&id);
//!     visited += 1;
//! }
//! assert_eq!(visited, 100);
//! # Ok::<(), pagescroll::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Entities   (flattened, one entity per pull) │
//! └──────────────────────┬───────────────────────┘
//!                        │ one page at a time
//! ┌──────────────────────┴───────────────────────┐
//! │  Pages      (trim policy, page cap, phases)  │
//! └──────────────────────┬───────────────────────┘
//!                        │ fetch(cursor, limit)
//! ┌──────────────────────┴───────────────────────┐
//! │  PageFetcher → CursorSource (external)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Everything is pull-based and synchronous: a fetch runs on the caller's
//! thread when the next entity is requested and nothing is buffered. Each
//! traversal owns its state; the source itself may change underneath it,
//! which only [`TrimPolicy::TrimLast`] tolerates.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and constants
pub mod types;

/// Cursor sources and the page fetcher
pub mod fetch;

/// Page scroller and entity iterator
pub mod scroll;

/// Rolling scans over self-describing cursors
pub mod scan;

/// Settings files
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{load_settings, load_settings_from_str, ScrollSettings};
pub use fetch::{CursorSource, MemorySource, PageFetcher};
pub use scan::{CursorScan, CursorScanBuilder, ScanIter};
pub use scroll::{Entities, PageScroller, Pages, ScrollPhase, ScrollerBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
