//! Plate-grid ("Disco Bio") spreadsheet layout.
//!
//! A 2D plate map: column 1 holds the antibody concentration per plate row,
//! column 2 the row letters A–H, and the remaining columns are headed by the
//! plate column numbers "1".."12" with the group label in each cell. The grid
//! is validated and repaired best-effort, annotated with the concentration on
//! titration columns 1–8, then unpivoted into one (Well, Well Group) row per
//! cell.

use super::{MetadataEntry, MetadataTable};
use crate::plate::plate_row_letters;
use crate::report::Report;

/// Expected header of the antibody-concentration column.
const CONCENTRATION_HEADER: &str = "Ab conc.\n[nM]";

pub(super) fn parse(
    headers: &[String],
    body: &[Vec<Option<String>>],
    report: &mut Report,
) -> MetadataTable {
    let mut cells: Vec<Vec<Option<String>>> = body.to_vec();

    validate_row_letter_column(&mut cells, report);
    validate_plate_column_headers(headers, report);
    broadcast_single_value_columns(headers.len(), &mut cells);
    strip_ppb_annotations(headers.len(), &mut cells);
    let concentrations = coerce_concentration_column(headers, &mut cells, report);
    annotate_titration_columns(headers, &mut cells, &concentrations);

    unpivot(headers, &cells, report)
}

/// Column 2 must hold exactly the letters A–H; a mismatch is flagged but the
/// column is still treated as the row-letter column.
fn validate_row_letter_column(cells: &mut [Vec<Option<String>>], report: &mut Report) {
    let mut seen: Vec<String> = cells
        .iter()
        .filter_map(|row| row.get(1).cloned().flatten())
        .collect();
    seen.sort();
    seen.dedup();

    let expected: Vec<String> = plate_row_letters().map(String::from).collect();
    if seen != expected {
        report.warn(format!(
            "plate-grid row-letter column holds {seen:?}, expected A-H; treating it as \"Row\" anyway"
        ));
    }
}

/// Headers beyond the first two must be the plate column numbers 1–12.
fn validate_plate_column_headers(headers: &[String], report: &mut Report) {
    for header in headers.iter().skip(2) {
        match header.trim().parse::<u32>() {
            Ok(n) if (1..=12).contains(&n) => {}
            _ => report.warn(format!("invalid plate-grid column name: {header:?}")),
        }
    }
}

/// A column with data in exactly one row is a one-shot value applying to all
/// wells; broadcast it over the whole column.
fn broadcast_single_value_columns(width: usize, cells: &mut [Vec<Option<String>>]) {
    for col in 0..width {
        let mut filled = cells.iter().filter_map(|row| row.get(col)?.clone());
        let first = filled.next();
        if let (Some(value), None) = (first, filled.next()) {
            for row in cells.iter_mut() {
                if let Some(slot) = row.get_mut(col) {
                    *slot = Some(value.clone());
                }
            }
        }
    }
}

/// Remove " (PPB-<digits>)" wherever it occurs in the grid cells.
fn strip_ppb_annotations(width: usize, cells: &mut [Vec<Option<String>>]) {
    for row in cells.iter_mut() {
        for col in 2..width {
            if let Some(Some(value)) = row.get_mut(col) {
                *value = strip_ppb(value);
            }
        }
    }
}

fn strip_ppb(text: &str) -> String {
    const MARKER: &str = " (PPB-";
    let mut out = text.to_string();
    let mut search_from = 0;
    while let Some(offset) = out[search_from..].find(MARKER) {
        let start = search_from + offset;
        let tail = &out[start + MARKER.len()..];
        let digits = tail.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 && tail.as_bytes().get(digits) == Some(&b')') {
            out.replace_range(start..start + MARKER.len() + digits + 1, "");
            search_from = start;
        } else {
            search_from = start + MARKER.len();
        }
    }
    out
}

/// Coerce the concentration column to numeric (2 decimal places) and return
/// the per-row values. Invalid parses become missing.
fn coerce_concentration_column(
    headers: &[String],
    cells: &mut [Vec<Option<String>>],
    report: &mut Report,
) -> Vec<Option<f64>> {
    if headers.first().map(String::as_str) != Some(CONCENTRATION_HEADER) {
        report.warn(format!(
            "first plate-grid column is {:?}, expected {CONCENTRATION_HEADER:?}",
            headers.first().map(String::as_str).unwrap_or_default()
        ));
    }

    let mut concentrations = Vec::with_capacity(cells.len());
    let mut invalid = false;
    for row in cells.iter_mut() {
        let parsed = row
            .first()
            .cloned()
            .flatten()
            .and_then(|text| text.trim().parse::<f64>().ok())
            .map(|value| (value * 100.0).round() / 100.0);
        if parsed.is_none() {
            invalid = true;
        }
        concentrations.push(parsed);
    }
    if invalid {
        report.warn("antibody concentration column contains non-numeric values");
    }
    concentrations
}

/// Columns 1–8 are titration wells; suffix each non-missing cell with the
/// row's concentration. Columns 9–12 are left unannotated.
fn annotate_titration_columns(
    headers: &[String],
    cells: &mut [Vec<Option<String>>],
    concentrations: &[Option<f64>],
) {
    for (row, conc) in cells.iter_mut().zip(concentrations) {
        let conc_text = match conc {
            Some(value) => format!("{value}"),
            None => "NaN".to_string(),
        };
        for (col, header) in headers.iter().enumerate().skip(2) {
            let is_titration = matches!(header.trim().parse::<u32>(), Ok(n) if (1..=8).contains(&n));
            if !is_titration {
                continue;
            }
            if let Some(Some(value)) = row.get_mut(col) {
                *value = format!("{value} ({conc_text} nM)");
            }
        }
    }
}

/// Unpivot the grid: each (Row, plate-column) cell becomes one entry with the
/// cell value as the group label and "<Row><column>" as the well.
fn unpivot(headers: &[String], cells: &[Vec<Option<String>>], report: &mut Report) -> MetadataTable {
    let mut table = MetadataTable::default();

    for (col, header) in headers.iter().enumerate().skip(2) {
        for (index, row) in cells.iter().enumerate() {
            let Some(letter) = row.get(1).cloned().flatten() else {
                report.warn(format!(
                    "plate-grid row {} has no row letter, skipping",
                    index + 2
                ));
                continue;
            };
            let well = format!("{letter}{}", header.trim());
            let well_group = row.get(col).cloned().flatten();
            table.push(
                MetadataEntry {
                    well,
                    well_group,
                    extra: Vec::new(),
                },
                report,
            );
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::strip_ppb;

    #[test]
    fn strips_ppb_suffixes_only() {
        assert_eq!(strip_ppb("mAb-1 (PPB-12)"), "mAb-1");
        assert_eq!(strip_ppb("A (PPB-1) B (PPB-234)"), "A B");
        assert_eq!(strip_ppb("keeps (PPB-x)"), "keeps (PPB-x)");
        assert_eq!(strip_ppb("keeps (PPB-12"), "keeps (PPB-12");
        assert_eq!(strip_ppb("plain"), "plain");
    }
}
