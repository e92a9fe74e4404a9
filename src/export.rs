//! # CSV Export
//!
//! Writes the two result tables back out as flat CSV files with the canonical
//! column layouts: attribute columns appear only for observed attributes, and
//! aggregated columns are suffixed `_avg` / `_std`.

use std::io::Write;
use std::path::Path;

use crate::engine::{AggregateTable, RowTable};

/// Write the row-level table as CSV.
///
/// Columns: Well, Well Group, Time, channel, one column per observed
/// attribute, Scan ID, then any extra metadata columns.
pub fn write_row_table<W: Write>(writer: W, table: &RowTable) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = vec![
        "Well".to_string(),
        "Well Group".to_string(),
        "Time".to_string(),
        "channel".to_string(),
    ];
    header.extend(table.attributes.iter().map(|a| a.token().to_string()));
    header.push("Scan ID".to_string());
    header.extend(table.extra_columns.iter().cloned());
    out.write_record(&header)?;

    for row in &table.rows {
        let mut record: Vec<String> = vec![
            row.well.clone(),
            row.well_group.clone().unwrap_or_default(),
            format_opt(row.time),
            row.channel.to_string(),
        ];
        for attribute in &table.attributes {
            record.push(format_opt(row.values.get(attribute).copied()));
        }
        record.push(table.scan_id.clone().unwrap_or_default());
        for value in &row.extra {
            record.push(value.clone().unwrap_or_default());
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the aggregated table as CSV.
///
/// Columns: Well Group, Time, channel, `<attribute>_avg` and
/// `<attribute>_std` per observed attribute, Scan ID.
pub fn write_aggregate_table<W: Write>(writer: W, table: &AggregateTable) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = vec![
        "Well Group".to_string(),
        "Time".to_string(),
        "channel".to_string(),
    ];
    for attribute in &table.attributes {
        header.push(format!("{}_avg", attribute.token()));
        header.push(format!("{}_std", attribute.token()));
    }
    header.push("Scan ID".to_string());
    out.write_record(&header)?;

    for row in &table.rows {
        let mut record: Vec<String> = vec![
            row.well_group.clone().unwrap_or_default(),
            format_opt(row.time),
            row.channel.to_string(),
        ];
        for attribute in &table.attributes {
            match row.stats.get(attribute) {
                Some(stats) => {
                    record.push(format!("{}", stats.mean));
                    record.push(format_opt(stats.std_dev));
                }
                None => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
        }
        record.push(table.scan_id.clone().unwrap_or_default());
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the row-level table to a file path.
pub fn write_row_table_path(path: impl AsRef<Path>, table: &RowTable) -> Result<(), csv::Error> {
    write_row_table(std::fs::File::create(path).map_err(csv::Error::from)?, table)
}

/// Write the aggregated table to a file path.
pub fn write_aggregate_table_path(
    path: impl AsRef<Path>,
    table: &AggregateTable,
) -> Result<(), csv::Error> {
    write_aggregate_table(std::fs::File::create(path).map_err(csv::Error::from)?, table)
}

fn format_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{build_row_table, aggregate};
    use crate::metadata::{MetadataEntry, MetadataTable};
    use crate::reader::WideTable;
    use crate::vocabulary::{Attribute, Channel};

    fn sample_rows() -> RowTable {
        let table = WideTable {
            channel: Channel::BF,
            attribute: Attribute::TotalIntensity,
            wells: vec!["A1".to_string(), "A2".to_string()],
            times: vec![Some(1.0)],
            values: vec![vec![Some(10.0), Some(20.0)]],
        };
        let metadata = MetadataTable {
            extra_columns: vec!["Cell Line".to_string()],
            entries: vec![
                MetadataEntry {
                    well: "A1".to_string(),
                    well_group: Some("G1".to_string()),
                    extra: vec![Some("HEK293".to_string())],
                },
                MetadataEntry {
                    well: "A2".to_string(),
                    well_group: Some("G1".to_string()),
                    extra: vec![Some("HEK293".to_string())],
                },
            ],
        };
        build_row_table(&[table], &metadata, Some("scan42".to_string()))
    }

    #[test]
    fn row_table_csv_layout() {
        let mut buffer = Vec::new();
        write_row_table(&mut buffer, &sample_rows()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Well,Well Group,Time,channel,total_intensity,Scan ID,Cell Line"
        );
        assert_eq!(lines.next().unwrap(), "A1,G1,1,BF,10,scan42,HEK293");
        assert_eq!(lines.next().unwrap(), "A2,G1,1,BF,20,scan42,HEK293");
    }

    #[test]
    fn aggregate_csv_has_avg_and_std_columns_for_observed_attributes_only() {
        let agg = aggregate(&sample_rows());
        let mut buffer = Vec::new();
        write_aggregate_table(&mut buffer, &agg).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Well Group,Time,channel,total_intensity_avg,total_intensity_std,Scan ID"
        );
        let data = lines.next().unwrap();
        assert!(data.starts_with("G1,1,BF,15,7.07"));
        assert!(data.ends_with("scan42"));
    }
}
