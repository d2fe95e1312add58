//! CLI module
//!
//! Command-line interface for scrolling record files.
//!
//! # Commands
//!
//! - `scan` - Print every record of a JSON file in id order, page by page
//! - `drain` - Delete rows while scrolling and report what was missed
//! - `settings` - Show the effective scroll settings

mod commands;
mod runner;

pub use commands::{parse_range, Cli, Commands, OutputFormat, ScrollArgs};
pub use runner::{
    drain_report, load_records, scan_records, DrainReport, Record, Runner, ScanReport,
};
