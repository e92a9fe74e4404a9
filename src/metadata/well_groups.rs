//! Well-group JSON layout, as exported by the instrument software.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::{MetadataEntry, MetadataError, MetadataTable};
use crate::plate::well_label;
use crate::report::Report;

/// Required filename of the well-group JSON export.
pub const WELL_GROUP_JSON: &str = "AnalysisWellGroup.json";

#[derive(Debug, Deserialize)]
struct WellGroupFile {
    #[serde(rename = "AnalysisWellGroupsCollection")]
    groups: Vec<WellGroupDef>,
}

#[derive(Debug, Deserialize)]
struct WellGroupDef {
    #[serde(rename = "GroupName")]
    name: String,
    #[serde(rename = "SelectedWells")]
    wells: Vec<WellCoordinate>,
}

#[derive(Debug, Deserialize)]
struct WellCoordinate {
    #[serde(rename = "Row")]
    row: usize,
    #[serde(rename = "Column")]
    column: usize,
}

/// Load a well-group JSON file into a metadata table.
///
/// Each group entry may list several wells; a well listed under two groups is
/// flagged and resolved last-write-wins.
pub(super) fn load(path: &Path, report: &mut Report) -> Result<MetadataTable, MetadataError> {
    report.info(format!("well-group JSON source: {}", path.display()));

    let reader = BufReader::new(File::open(path)?);
    let file: WellGroupFile = serde_json::from_reader(reader)?;

    let mut table = MetadataTable::default();
    for group in file.groups {
        for coordinate in group.wells {
            let well = well_label(coordinate.row, coordinate.column)?;
            table.push(
                MetadataEntry {
                    well,
                    well_group: Some(group.name.clone()),
                    extra: Vec::new(),
                },
                report,
            );
        }
    }
    Ok(table)
}
