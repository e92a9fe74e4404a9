//! # Instrument File Reader
//!
//! Discovers instrument CSV exports in a staging directory, classifies them by
//! filename convention and channel/attribute vocabulary, and normalizes each
//! into a wide table (one row per timepoint, one column per well).
//!
//! Two mutually exclusive naming conventions exist:
//!
//! - `*summary_positions_<channel>_<attribute>.csv` — per-position summaries,
//!   usable only when every well has a single position.
//! - `*summary_wells_<channel>_<attribute>.csv` — per-well summaries.
//!
//! The per-position parse reports an explicit [`PositionOutcome`] so the
//! orchestrator can distinguish "layout does not apply, fall back to per-well"
//! from an empty but valid parse.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::report::Report;
use crate::vocabulary::{Attribute, Channel};

/// Errors that abort reading an instrument export.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error listing or reading the staging directory.
    #[error("failed to read instrument files: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

/// Which filename convention a file follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    /// `summary_positions_` exports.
    Positions,
    /// `summary_wells_` exports.
    Wells,
}

impl SummaryKind {
    /// The filename marker for this convention, including the trailing
    /// separator before the `<channel>_<attribute>` label.
    pub fn marker(&self) -> &'static str {
        match self {
            SummaryKind::Positions => "summary_positions_",
            SummaryKind::Wells => "summary_wells_",
        }
    }
}

/// One normalized wide table: a channel/attribute pair with one row per
/// timepoint and one numeric column per well.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    /// Imaging channel from the filename label.
    pub channel: Channel,
    /// Measurement attribute from the filename label.
    pub attribute: Attribute,
    /// Well labels in column order.
    pub wells: Vec<String>,
    /// Timepoints, one per row; non-numeric values are missing.
    pub times: Vec<Option<f64>>,
    /// Cell values, `values[row][well_index]`.
    pub values: Vec<Vec<Option<f64>>>,
}

/// Result of attempting the per-position parse for a whole directory.
#[derive(Debug)]
pub enum PositionOutcome {
    /// Per-position layout applies; tables are normalized and ready.
    Parsed(Vec<WideTable>),
    /// No per-position files, or a promoted column label lacked "Position 1";
    /// the caller must fall back to per-well parsing.
    LayoutMismatch,
}

/// Parse all per-position summary files in the directory.
///
/// The layout applies only when every promoted well-column label carries the
/// "Position 1" marker; any other label means multiple positions per well and
/// the whole directory falls back to per-well summaries.
pub fn parse_position_summaries(
    dir: &Path,
    report: &mut Report,
) -> Result<PositionOutcome, ReaderError> {
    let files = summary_files(dir, SummaryKind::Positions)?;
    if files.is_empty() {
        return Ok(PositionOutcome::LayoutMismatch);
    }

    let mut tables = Vec::new();
    for path in files {
        let Some((channel, attribute)) = classify(&path, SummaryKind::Positions, report) else {
            continue;
        };
        let Some(mut raw) = load_promoted(&path, SummaryKind::Positions, report)? else {
            continue;
        };

        if !raw.well_labels.iter().all(|label| label.contains("Position 1")) {
            return Ok(PositionOutcome::LayoutMismatch);
        }
        for label in &mut raw.well_labels {
            *label = label.replace(" - Position 1", "");
        }

        tables.push(finalize(&path, channel, attribute, raw, report));
    }
    Ok(PositionOutcome::Parsed(tables))
}

/// Parse all per-well summary files in the directory.
pub fn parse_well_summaries(dir: &Path, report: &mut Report) -> Result<Vec<WideTable>, ReaderError> {
    let mut tables = Vec::new();
    for path in summary_files(dir, SummaryKind::Wells)? {
        let Some((channel, attribute)) = classify(&path, SummaryKind::Wells, report) else {
            continue;
        };
        let Some(raw) = load_promoted(&path, SummaryKind::Wells, report)? else {
            continue;
        };
        tables.push(finalize(&path, channel, attribute, raw, report));
    }
    Ok(tables)
}

/// CSV files in the directory following the given convention, sorted by name.
fn summary_files(dir: &Path, kind: SummaryKind) -> Result<Vec<PathBuf>, ReaderError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            file_name(path)
                .is_some_and(|name| name.ends_with(".csv") && name.contains(kind.marker()))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Split the `<channel>_<attribute>` label out of the filename and validate
/// both tokens against the closed vocabularies. Unrecognized tokens are
/// reported and the file is skipped.
fn classify(path: &Path, kind: SummaryKind, report: &mut Report) -> Option<(Channel, Attribute)> {
    let name = file_name(path)?;
    let label = name
        .split_once(kind.marker())
        .map(|(_, rest)| rest.trim_end_matches(".csv"))?;

    let Some((channel_token, attribute_token)) = label.split_once('_') else {
        report.warn(format!(
            "cannot split channel/attribute label {label:?} in {name}"
        ));
        return None;
    };

    let channel = match Channel::from_str(channel_token) {
        Ok(channel) => channel,
        Err(e) => {
            report.warn(format!("{e} in {name}"));
            return None;
        }
    };
    let attribute = match Attribute::from_str(attribute_token) {
        Ok(attribute) => attribute,
        Err(e) => {
            report.warn(format!("{e} in {name}"));
            return None;
        }
    };
    Some((channel, attribute))
}

/// A raw table after header promotion, before numeric coercion.
struct PromotedTable {
    well_labels: Vec<String>,
    body: Vec<Vec<String>>,
}

/// Load a raw export and normalize its header structure.
///
/// The instrument writes two header rows: the CSV header line itself (with an
/// optional redundant "Scan" index column), then a row of per-well labels,
/// then a blank/unit row. The label row is promoted to become the header for
/// every column but the first, and both extra rows are dropped.
fn load_promoted(
    path: &Path,
    kind: SummaryKind,
    report: &mut Report,
) -> Result<Option<PromotedTable>, ReaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        records.push(record.iter().map(|field| field.to_string()).collect());
    }

    if records.len() < 3 {
        report.warn(format!(
            "{} has fewer rows than the two-header-row layout requires, skipping",
            path.display()
        ));
        return Ok(None);
    }

    let width = records[0].len();
    for row in &mut records {
        row.resize(width, String::new());
    }

    // Redundant scan-index column.
    let mut drop: Vec<usize> = Vec::new();
    if records[0].first().map(String::as_str) == Some("Scan") {
        drop.push(0);
    }
    // The instrument's own deviation column is superseded by this pipeline's
    // aggregation.
    if kind == SummaryKind::Wells {
        drop.extend(
            records[0]
                .iter()
                .enumerate()
                .filter(|(_, h)| h.as_str() == "Stdev")
                .map(|(i, _)| i),
        );
    }
    if !drop.is_empty() {
        for row in &mut records {
            let mut index = 0;
            row.retain(|_| {
                let keep = !drop.contains(&index);
                index += 1;
                keep
            });
        }
    }

    let well_labels: Vec<String> = records[1].iter().skip(1).cloned().collect();
    let body: Vec<Vec<String>> = records.split_off(3);
    Ok(Some(PromotedTable { well_labels, body }))
}

/// Apply the shared post-normalization: strip "Well " prefixes, trim labels,
/// coerce every cell to numeric.
fn finalize(
    path: &Path,
    channel: Channel,
    attribute: Attribute,
    raw: PromotedTable,
    report: &mut Report,
) -> WideTable {
    let wells: Vec<String> = raw
        .well_labels
        .iter()
        .map(|label| label.replace("Well ", "").trim().to_string())
        .collect();

    let mut coerced = 0usize;
    let mut times = Vec::with_capacity(raw.body.len());
    let mut values = Vec::with_capacity(raw.body.len());
    for row in &raw.body {
        times.push(parse_cell(row.first(), &mut coerced));
        values.push(
            (1..=wells.len())
                .map(|i| parse_cell(row.get(i), &mut coerced))
                .collect(),
        );
    }

    if coerced > 0 {
        report.warn(format!(
            "{} non-numeric cells coerced to missing in {}",
            coerced,
            path.display()
        ));
    }

    WideTable {
        channel,
        attribute,
        wells,
        times,
        values,
    }
}

fn parse_cell(cell: Option<&String>, coerced: &mut usize) -> Option<f64> {
    let text = cell.map(|c| c.trim()).unwrap_or_default();
    if text.is_empty() {
        return None;
    }
    match text.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            *coerced += 1;
            None
        }
    }
}
