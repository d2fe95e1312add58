//! CLI commands and argument parsing

use crate::config::{PageSizeRange, ScrollSettings};
use crate::error::{Error, Result};
use crate::types::{LogLevel, TrimPolicy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Page scroller command line
#[derive(Parser, Debug)]
#[command(name = "pagescroll")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LogLevel,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective log level
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scroll through a JSON record file in id order
    Scan {
        /// Records file: a JSON array or one JSON object per line
        #[arg(short, long)]
        input: PathBuf,

        /// Integer field used as the cursor
        #[arg(long, default_value = "id")]
        id_field: String,

        #[command(flatten)]
        scroll: ScrollArgs,
    },

    /// Scroll synthetic rows while deleting each visited one
    Drain {
        /// Number of rows (ids 1..=count)
        #[arg(long, default_value = "100")]
        count: u32,

        #[command(flatten)]
        scroll: ScrollArgs,
    },

    /// Show the effective scroll settings
    Settings {
        #[command(flatten)]
        scroll: ScrollArgs,
    },
}

/// Scroll options overriding the settings file
#[derive(Args, Debug, Clone, Default)]
pub struct ScrollArgs {
    /// Fixed page size
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Random page size per fetch, as MIN-MAX
    #[arg(long, conflicts_with = "page_size")]
    pub page_size_range: Option<String>,

    /// Trimming policy
    #[arg(long)]
    pub policy: Option<TrimPolicy>,

    /// Maximum number of fetch calls
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// First cursor (inclusive)
    #[arg(long)]
    pub start: Option<i64>,
}

impl ScrollArgs {
    /// Overlay these options onto loaded settings
    pub fn apply(&self, mut settings: ScrollSettings) -> Result<ScrollSettings> {
        if let Some(size) = self.page_size {
            settings.page_size = Some(size);
            settings.page_size_range = None;
        }
        if let Some(range) = &self.page_size_range {
            settings.page_size_range = Some(parse_range(range)?);
            settings.page_size = None;
        }
        if let Some(policy) = self.policy {
            settings.policy = policy;
        }
        if let Some(max_pages) = self.max_pages {
            settings.max_pages = Some(max_pages);
        }
        if let Some(start) = self.start {
            settings.start = Some(start);
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Parse `MIN-MAX` into a page size range
pub fn parse_range(value: &str) -> Result<PageSizeRange> {
    let (min, max) = value.split_once('-').ok_or_else(|| {
        Error::invalid_value("page_size_range", format!("expected MIN-MAX, got '{value}'"))
    })?;
    let parse = |part: &str| {
        part.trim().parse::<usize>().map_err(|e| {
            Error::invalid_value("page_size_range", format!("'{}': {e}", part.trim()))
        })
    };
    Ok(PageSizeRange {
        min: parse(min)?,
        max: parse(max)?,
    })
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
