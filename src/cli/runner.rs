//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, ScrollArgs};
use crate::config::{load_settings, ScrollSettings};
use crate::error::{Error, Result, ResultExt};
use crate::fetch::MemorySource;
use crate::scroll::PageScroller;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::convert::Infallible;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// A record loaded from a JSON file, keyed by its integer id
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Cursor value
    pub id: i64,
    /// Full record
    pub value: Value,
}

/// Outcome of a `drain` run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub policy: String,
    pub rows: usize,
    pub visited: usize,
    pub missed: Vec<i64>,
    pub fetches: usize,
}

/// Outcome of a `scan` run
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    /// Records in the order they were scrolled
    pub records: Vec<Record>,
    pub fetches: usize,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Scan {
                input,
                id_field,
                scroll,
            } => self.scan(input, id_field, scroll),
            Commands::Drain { count, scroll } => self.drain(*count, scroll),
            Commands::Settings { scroll } => self.show_settings(scroll),
        }
    }

    /// Load settings file (if any) and overlay command line options
    fn load_settings(&self, args: &ScrollArgs) -> Result<ScrollSettings> {
        let base = match &self.cli.settings {
            Some(path) => load_settings(path)?,
            None => ScrollSettings::default(),
        };
        args.apply(base)
    }

    /// Print every record in id order
    fn scan(&self, input: &Path, id_field: &str, args: &ScrollArgs) -> Result<()> {
        let settings = self.load_settings(args)?;
        let report = scan_records(input, id_field, &settings)?;
        for record in &report.records {
            self.output_message(&record.value);
        }
        info!(
            "Scanned {} records in {} fetches ({})",
            report.records.len(),
            report.fetches,
            settings.policy
        );
        Ok(())
    }

    /// Delete rows while scrolling and report the outcome
    fn drain(&self, count: u32, args: &ScrollArgs) -> Result<()> {
        let settings = self.load_settings(args)?;
        let report = drain_report(count, &settings)?;
        if !report.missed.is_empty() {
            warn!(
                "{} of {} rows were skipped by {}; use trim_last when deleting while scrolling",
                report.missed.len(),
                report.rows,
                report.policy
            );
        }
        self.output_message(&serde_json::to_value(&report)?);
        Ok(())
    }

    /// Print the effective settings
    fn show_settings(&self, args: &ScrollArgs) -> Result<()> {
        let settings = self.load_settings(args)?;
        self.output_message(&json!({
            "settings": serde_json::to_value(&settings)?,
            "mutation_safe": settings.policy.is_mutation_safe(),
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Load a record file and scroll it with the given settings
pub fn scan_records(
    input: &Path,
    id_field: &str,
    settings: &ScrollSettings,
) -> Result<ScanReport> {
    let records = load_records(input, id_field)?;
    info!("Loaded {} records from {}", records.len(), input.display());

    let store = MemorySource::from_records(records, |r: &Record| r.id);
    let scroller = settings
        .configure(PageScroller::builder().source(store.clone()))?
        .cursor_extractor(|r: &Record| r.id)
        .build()?;

    let records = scroller
        .entities()
        .map(|record| record.unwrap_or_else(|never: Infallible| match never {}))
        .collect();
    Ok(ScanReport {
        records,
        fetches: store.fetch_count(),
    })
}

/// Scroll ids `1..=count`, deleting each id right after it is visited
pub fn drain_report(count: u32, settings: &ScrollSettings) -> Result<DrainReport> {
    let store: MemorySource<i64, i64> = MemorySource::from_records(1..=i64::from(count), |n| *n);
    let scroller = settings
        .configure(PageScroller::builder().source(store.clone()))?
        .cursor_extractor(|n: &i64| *n)
        .build()?;

    let mut visited = 0usize;
    let mut last_visited: Option<i64> = None;
    for id in &scroller {
        let id = id.unwrap_or_else(|never: Infallible| match never {});
        store.remove(&id);
        visited += 1;
        last_visited = Some(id);
    }

    // Every row from the start on that is still present was skipped, unless
    // the page cap ended the scroll early; then only rows below the last
    // visited id count.
    let fetches = store.fetch_count();
    let capped = settings.max_pages.is_some_and(|cap| fetches >= cap);
    let first = settings.start.unwrap_or(1);
    let end = if capped {
        last_visited.unwrap_or(first)
    } else {
        i64::from(count) + 1
    };
    let missed = (first..end).filter(|id| store.contains(id)).collect();

    Ok(DrainReport {
        policy: settings.policy.to_string(),
        rows: count as usize,
        visited,
        missed,
        fetches,
    })
}

/// Load records from a JSON array or JSON-lines file
///
/// Ids must be unique; a repeated id is rejected rather than shadowing the
/// earlier record.
pub fn load_records(path: &Path, id_field: &str) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    let values: Vec<Value> = if content.trim_start().starts_with('[') {
        serde_json::from_str(&content)?
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| format!("Line {}", i + 1))
            })
            .collect::<Result<_>>()?
    };

    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let id = value
                .get(id_field)
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    Error::config(format!("Record {i} has no integer '{id_field}' field"))
                })?;
            if !seen.insert(id) {
                return Err(Error::invalid_value(
                    id_field,
                    format!("record {i} repeats id {id}"),
                ));
            }
            Ok(Record { id, value })
        })
        .collect()
}
