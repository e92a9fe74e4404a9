//! # Metadata Resolver
//!
//! Locates the single well-to-group metadata source in a staging directory and
//! normalizes it into a canonical (Well, Well Group, extra columns) table.
//!
//! Three layouts are supported:
//!
//! 1. **Template spreadsheet**: first column named "Well", one row per well;
//!    the group label is the space-joined text of every other column, and the
//!    other columns are preserved as extra metadata.
//! 2. **Plate-grid spreadsheet**: a 2D plate map with row letters in the
//!    second column and plate columns "1".."12" as headers, including the
//!    antibody-concentration annotation rules.
//! 3. **Well-group JSON**: `AnalysisWellGroup.json` as exported by the
//!    instrument software, decoded through the well-label codec.
//!
//! Layout anomalies are repaired best-effort and recorded on the shared
//! [`Report`](crate::report::Report); only an ambiguous spreadsheet set
//! (more than one `.xlsx`) is fatal.

mod error;
mod grid;
mod template;
mod well_groups;

#[cfg(test)]
mod tests;

pub use error::MetadataError;
pub use well_groups::WELL_GROUP_JSON;

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::report::Report;

/// One well's metadata assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    /// Canonical well label ("A1").
    pub well: String,
    /// Group label, if the source assigned one.
    pub well_group: Option<String>,
    /// Values for the table's extra columns, aligned with
    /// [`MetadataTable::extra_columns`].
    pub extra: Vec<Option<String>>,
}

/// Canonical well → group mapping plus preserved descriptive columns.
///
/// Extra columns are kept in a side list rather than mixed into the numeric
/// schema; they ride along through joins untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable {
    /// Names of preserved descriptive columns (template layout only).
    pub extra_columns: Vec<String>,
    /// Entries in source order.
    pub entries: Vec<MetadataEntry>,
}

impl MetadataTable {
    /// An empty table, used when no metadata source could be resolved.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the table carries no assignments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a well's assignment. Duplicate assignments resolve
    /// last-write-wins, matching the documented at-most-one-group contract.
    pub fn lookup(&self, well: &str) -> Option<&MetadataEntry> {
        self.entries.iter().rev().find(|e| e.well == well)
    }

    fn push(&mut self, entry: MetadataEntry, report: &mut Report) {
        if self.entries.iter().any(|e| e.well == entry.well) {
            report.warn(format!(
                "well {} assigned to more than one group; keeping the later assignment",
                entry.well
            ));
        }
        self.entries.push(entry);
    }
}

/// Resolve the metadata source for a staging directory.
///
/// Returns an empty table (with diagnostics) when no source can be resolved;
/// fails only on an ambiguous spreadsheet set or an unreadable source.
pub fn resolve_metadata(dir: &Path, report: &mut Report) -> Result<MetadataTable, MetadataError> {
    let spreadsheets = files_with_extension(dir, "xlsx")?;

    match spreadsheets.len() {
        1 => load_spreadsheet(&spreadsheets[0], report),
        0 => resolve_json(dir, report),
        n => Err(MetadataError::AmbiguousSpreadsheets(n)),
    }
}

fn resolve_json(dir: &Path, report: &mut Report) -> Result<MetadataTable, MetadataError> {
    report.info("no spreadsheet found, looking for a well-group JSON file");
    let json_files = files_with_extension(dir, "json")?;
    match json_files.len() {
        0 => {
            report.warn("no JSON metadata file found; metadata extraction is not possible");
            Ok(MetadataTable::empty())
        }
        1 => {
            let path = &json_files[0];
            if path.file_name().and_then(|n| n.to_str()) != Some(WELL_GROUP_JSON) {
                report.warn(format!(
                    "expected {WELL_GROUP_JSON}, found {}; metadata left unresolved",
                    path.display()
                ));
                return Ok(MetadataTable::empty());
            }
            well_groups::load(path, report)
        }
        _ => {
            report.warn("multiple JSON metadata files found; metadata left unresolved");
            Ok(MetadataTable::empty())
        }
    }
}

fn load_spreadsheet(path: &Path, report: &mut Report) -> Result<MetadataTable, MetadataError> {
    report.info(format!("spreadsheet metadata source: {}", path.display()));

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| MetadataError::EmptySpreadsheet(path.display().to_string()))??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| MetadataError::EmptySpreadsheet(path.display().to_string()))?
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    let body: Vec<Vec<Option<String>>> = rows
        .map(|row| {
            let mut cells: Vec<Option<String>> = row.iter().map(cell_text).collect();
            // Trailing cells missing from short rows read as absent.
            cells.resize(headers.len(), None);
            cells
        })
        .collect();

    if headers.first().map(String::as_str) == Some("Well") {
        report.info("found template spreadsheet layout");
        Ok(template::parse(&headers, &body, report))
    } else {
        report.info("template layout not detected, parsing as plate-grid layout");
        Ok(grid::parse(&headers, &body, report))
    }
}

/// Render a spreadsheet cell as text; empty and error cells become `None`.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let s = s.trim_matches(|c: char| c == ' ');
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Data::Float(f) => Some(format!("{f}")),
        Data::Int(i) => Some(format!("{i}")),
        Data::Bool(b) => Some(format!("{b}")),
        Data::DateTime(_) => Some(cell.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, MetadataError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect();
    files.sort();
    Ok(files)
}
