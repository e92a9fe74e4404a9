//! Template spreadsheet layout: first column "Well", one row per well.
//!
//! Every other column is a descriptive axis; the group label is the
//! space-joined text of those columns, and the columns themselves are
//! preserved as extra metadata so they survive the joins.

use super::{MetadataEntry, MetadataTable};
use crate::report::Report;

pub(super) fn parse(
    headers: &[String],
    body: &[Vec<Option<String>>],
    report: &mut Report,
) -> MetadataTable {
    let mut table = MetadataTable {
        extra_columns: headers.iter().skip(1).cloned().collect(),
        entries: Vec::new(),
    };

    for (index, row) in body.iter().enumerate() {
        let Some(well) = row.first().cloned().flatten() else {
            report.warn(format!(
                "template row {} has no well label, skipping",
                index + 2
            ));
            continue;
        };

        let extra: Vec<Option<String>> = row.iter().skip(1).cloned().collect();
        let joined = extra
            .iter()
            .filter_map(|v| v.as_deref())
            .collect::<Vec<_>>()
            .join(" ");
        let well_group = if joined.is_empty() { None } else { Some(joined) };

        table.push(
            MetadataEntry {
                well,
                well_group,
                extra,
            },
            report,
        );
    }

    table
}
