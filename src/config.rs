//! Scroll settings
//!
//! Declarative scroller settings loaded from YAML (or JSON) files, used by
//! the command line and by callers that keep scroll tuning outside code.
//!
//! ```yaml
//! page_size_range:
//!   min: 1
//!   max: 10
//! policy: trim_last
//! max_pages: 50
//! start: 100
//! ```

use crate::error::{Error, Result};
use crate::scroll::ScrollerBuilder;
use crate::types::{PageSize, TrimPolicy, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Inclusive bounds for randomized page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeRange {
    /// Smallest page size
    pub min: usize,
    /// Largest page size
    pub max: usize,
}

/// Scroller settings for integer-keyed sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrollSettings {
    /// Fixed page size (defaults to 30)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,

    /// Random page size drawn per fetch; exclusive with `page_size`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size_range: Option<PageSizeRange>,

    /// Trimming policy
    #[serde(default)]
    pub policy: TrimPolicy,

    /// Maximum number of fetch calls; 0 is rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// First cursor (inclusive); absent reads from the beginning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
}

impl ScrollSettings {
    /// Check the settings for invalid values
    pub fn validate(&self) -> Result<()> {
        if self.page_size.is_some() && self.page_size_range.is_some() {
            return Err(Error::config(
                "page_size and page_size_range cannot both be set",
            ));
        }
        if self.page_size == Some(0) {
            return Err(Error::invalid_value("page_size", "must be positive, got 0"));
        }
        if let Some(range) = self.page_size_range {
            if range.min == 0 {
                return Err(Error::invalid_value(
                    "page_size_range",
                    "lower bound must be at least 1",
                ));
            }
            if range.min > range.max {
                return Err(Error::invalid_value(
                    "page_size_range",
                    format!("lower bound {} exceeds upper bound {}", range.min, range.max),
                ));
            }
        }
        if self.max_pages == Some(0) {
            return Err(Error::invalid_value("max_pages", "must be positive, got 0"));
        }
        Ok(())
    }

    /// Page size described by these settings
    pub fn page_size(&self) -> Result<PageSize> {
        match (self.page_size, self.page_size_range) {
            (Some(size), None) => Ok(PageSize::Fixed(size)),
            (None, Some(range)) => PageSize::random(range.min, range.max),
            (None, None) => Ok(PageSize::Fixed(DEFAULT_PAGE_SIZE)),
            (Some(_), Some(_)) => Err(Error::config(
                "page_size and page_size_range cannot both be set",
            )),
        }
    }

    /// Apply these settings to a scroller builder
    pub fn configure<E, Err>(
        &self,
        builder: ScrollerBuilder<i64, E, Err>,
    ) -> Result<ScrollerBuilder<i64, E, Err>> {
        self.validate()?;
        let mut builder = builder.page_size(self.page_size()?).policy(self.policy);
        if let Some(max_pages) = self.max_pages {
            builder = builder.max_pages(max_pages);
        }
        if let Some(start) = self.start {
            builder = builder.start(start);
        }
        Ok(builder)
    }
}

/// Load settings from a YAML or JSON file
pub fn load_settings(path: impl AsRef<Path>) -> Result<ScrollSettings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_settings_from_str(&content)
}

/// Load settings from a YAML or JSON string
pub fn load_settings_from_str(content: &str) -> Result<ScrollSettings> {
    let settings: ScrollSettings = serde_yaml::from_str(content)?;
    settings.validate()?;
    Ok(settings)
}
