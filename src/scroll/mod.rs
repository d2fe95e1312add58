//! Scroll module
//!
//! Turns repeated bounded fetches into one lazy, forward-only sequence.
//!
//! # Overview
//!
//! A [`PageScroller`] is configuration only. Every call to
//! [`PageScroller::pages`] or [`PageScroller::entities`] starts a fresh,
//! independent traversal that owns its own cursor and page counter:
//!
//! - [`Pages`] yields one batch per fetch call, applying the [`TrimPolicy`]
//!   and stopping on a short page or when the page cap is hit
//! - [`Entities`] flattens those batches, fetching the next page only when
//!   the current one has been consumed
//!
//! Nothing is fetched until the first pull, and a caller that stops pulling
//! never triggers another fetch.
//!
//! ```rust
//! use pagescroll::scroll::PageScroller;
//! use pagescroll::TrimPolicy;
//! use std::convert::Infallible;
//!
//! let scroller = PageScroller::builder()
//!     .source(|cursor: Option<u64>, limit: usize| -> Result<Vec<u64>, Infallible> {
//!         let start = cursor.unwrap_or(0);
//!         Ok((start..start.saturating_add(limit as u64)).take_while(|n| *n < 50).collect())
//!     })
//!     .cursor_extractor(|n: &u64| *n)
//!     .start(10)
//!     .page_size(7)
//!     .policy(TrimPolicy::TrimLast)
//!     .build()
//!     .unwrap();
//!
//! let ids: Vec<u64> = scroller.entities().collect::<Result<_, _>>().unwrap();
//! assert_eq!(ids, (10..50).collect::<Vec<_>>());
//! ```
//!
//! [`TrimPolicy`]: crate::types::TrimPolicy

mod builder;
mod entities;
mod scroller;
mod types;

pub use builder::ScrollerBuilder;
pub use entities::Entities;
pub use scroller::{PageScroller, Pages};
pub use types::ScrollPhase;

#[cfg(test)]
mod tests;
