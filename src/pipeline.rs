//! # Pipeline Orchestrator
//!
//! `process` ties the components together for one staging directory: validate
//! the directory, derive the Scan ID, parse the instrument exports (trying the
//! per-position layout first), resolve metadata, and run the
//! reshape-and-join engine. Returns both result tables plus the collected
//! diagnostics.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::engine::{self, AggregateTable, RowTable};
use crate::metadata::{self, MetadataError};
use crate::reader::{self, PositionOutcome, ReaderError};
use crate::report::Report;

/// File extensions the pipeline recognizes in a staging directory.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "json"];

/// Errors that abort the whole pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Staging directory does not exist.
    #[error("data directory not found: {0}")]
    DirectoryNotFound(String),

    /// Directory exists but holds no file with a supported extension.
    #[error("no supported files found in {dir}; expected extensions: {extensions:?}")]
    NoSupportedFiles {
        /// The offending directory.
        dir: String,
        /// The accepted extensions.
        extensions: [&'static str; 3],
    },

    /// I/O error while scanning the directory.
    #[error("failed to scan staging directory: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata resolution failed structurally.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Instrument file reading failed structurally.
    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// Everything one invocation produces.
#[derive(Debug)]
pub struct ProcessOutput {
    /// One row per (Well Group, Time, channel) with mean/std per attribute.
    pub aggregated: AggregateTable,
    /// One row per (Well, Time, channel) measurement.
    pub rows: RowTable,
    /// Non-fatal diagnostics collected along the way.
    pub report: Report,
}

/// Process one staging directory into the aggregated and row-level tables.
pub fn process(staging_dir: impl AsRef<Path>) -> Result<ProcessOutput, PipelineError> {
    let dir = staging_dir.as_ref();
    validate_directory(dir)?;

    let mut report = Report::new();
    let scan_id = extract_scan_id(dir, &mut report)?;

    let tables = match reader::parse_position_summaries(dir, &mut report)? {
        PositionOutcome::Parsed(tables) => tables,
        PositionOutcome::LayoutMismatch => {
            report.info("per-position layout not applicable, switching to well summary files");
            reader::parse_well_summaries(dir, &mut report)?
        }
    };

    let metadata = metadata::resolve_metadata(dir, &mut report)?;

    let rows = engine::build_row_table(&tables, &metadata, scan_id);
    let aggregated = engine::aggregate(&rows);

    Ok(ProcessOutput {
        aggregated,
        rows,
        report,
    })
}

fn validate_directory(dir: &Path) -> Result<(), PipelineError> {
    if !dir.exists() {
        return Err(PipelineError::DirectoryNotFound(dir.display().to_string()));
    }

    let has_supported = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .any(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| {
                    SUPPORTED_EXTENSIONS
                        .iter()
                        .any(|s| s.eq_ignore_ascii_case(e))
                })
        });
    if !has_supported {
        return Err(PipelineError::NoSupportedFiles {
            dir: dir.display().to_string(),
            extensions: SUPPORTED_EXTENSIONS,
        });
    }
    Ok(())
}

/// Derive the Scan ID from the single common filename prefix (up to the first
/// `_`) of all CSV exports. Disagreeing prefixes leave it unresolved.
fn extract_scan_id(dir: &Path, report: &mut Report) -> Result<Option<String>, PipelineError> {
    let mut prefixes: BTreeSet<String> = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.ends_with(".csv") {
            let prefix = name.split('_').next().unwrap_or(&name).to_string();
            prefixes.insert(prefix);
        }
    }

    match prefixes.len() {
        1 => Ok(prefixes.into_iter().next()),
        0 => {
            report.warn("no CSV files found, scan ID is unknown");
            Ok(None)
        }
        _ => {
            report.warn("multiple scan ID prefixes found, scan ID is unknown");
            Ok(None)
        }
    }
}
