//! Common types used throughout pagescroll
//!
//! Page sizing, trimming policies and log levels shared by the scroller,
//! the settings loader and the CLI.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 30;

// ============================================================================
// Page Size
// ============================================================================

/// Number of entities requested per fetch
///
/// A dynamic size is evaluated again before every fetch call, so a single
/// traversal may request differently sized pages.
#[derive(Clone)]
pub enum PageSize {
    /// Same size for every fetch
    Fixed(usize),
    /// Size computed right before each fetch
    Dynamic(Arc<dyn Fn() -> usize + Send + Sync>),
}

impl PageSize {
    /// Create a page size evaluated per fetch
    pub fn dynamic(supplier: impl Fn() -> usize + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(supplier))
    }

    /// Create a page size drawn uniformly from `min..=max` on every fetch
    pub fn random(min: usize, max: usize) -> Result<Self> {
        if min == 0 {
            return Err(Error::invalid_value(
                "page_size_range",
                "lower bound must be at least 1",
            ));
        }
        if min > max {
            return Err(Error::invalid_value(
                "page_size_range",
                format!("lower bound {min} exceeds upper bound {max}"),
            ));
        }
        Ok(Self::dynamic(move || rand::thread_rng().gen_range(min..=max)))
    }

    /// The literal size, if this is a fixed page size
    pub fn fixed_value(&self) -> Option<usize> {
        match self {
            Self::Fixed(size) => Some(*size),
            Self::Dynamic(_) => None,
        }
    }

    /// Evaluate the size for the next fetch
    ///
    /// A supplier returning 0 is clamped to 1.
    pub fn resolve(&self) -> usize {
        match self {
            Self::Fixed(size) => *size,
            Self::Dynamic(supplier) => {
                let size = supplier();
                if size == 0 {
                    tracing::warn!("Page size supplier returned 0, using 1");
                    1
                } else {
                    size
                }
            }
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::Fixed(DEFAULT_PAGE_SIZE)
    }
}

impl From<usize> for PageSize {
    fn from(size: usize) -> Self {
        Self::Fixed(size)
    }
}

impl fmt::Debug for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

// ============================================================================
// Trim Policy
// ============================================================================

/// How the element shared by two consecutive pages is discarded
///
/// Fetches are start-inclusive: asking for `(cursor = x, limit = n)` returns
/// `x` itself first when it still exists. Every page transition therefore
/// carries one overlapping element that must be dropped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TrimPolicy {
    /// Resume from the last yielded element and drop it from the next page.
    ///
    /// **Not safe under deletion.** If the caller deletes the last yielded
    /// element before the next fetch, the source no longer returns it and the
    /// first unseen element is dropped instead. Kept as the default only for
    /// compatibility; prefer [`TrimPolicy::TrimLast`].
    #[default]
    TrimFirst,
    /// Over-fetch by one and keep the extra element back as the next cursor.
    ///
    /// The boundary element is never yielded before it seeds the next fetch,
    /// so deleting already-visited elements cannot shift the scroll.
    TrimLast,
}

impl TrimPolicy {
    /// Whether this policy stays correct when visited elements are deleted
    pub fn is_mutation_safe(&self) -> bool {
        matches!(self, Self::TrimLast)
    }
}

impl fmt::Display for TrimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrimFirst => f.write_str("trim_first"),
            Self::TrimLast => f.write_str("trim_last"),
        }
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
