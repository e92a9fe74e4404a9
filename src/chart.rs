//! # Chart Series Extraction
//!
//! Reshapes the aggregated table into chart-ready series for a host UI: one
//! `(x = Time, y = mean)` series per well group for a chosen channel and
//! attribute, plus the attribute's display unit. Output is serializable so a
//! host can hand it straight to a client-side charting library.

use serde::Serialize;

use crate::engine::AggregateTable;
use crate::vocabulary::{Attribute, Channel};

/// One chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Timepoint.
    pub x: f64,
    /// Aggregated mean value.
    pub y: f64,
}

/// One well group's series.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    /// Series label (the group name).
    pub label: String,
    /// Points sorted by time; missing values are dropped.
    pub data: Vec<ChartPoint>,
}

/// Chart-ready view of one channel/attribute slice of the aggregated table.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    /// One series per well group with data.
    pub datasets: Vec<ChartSeries>,
    /// The plotted attribute.
    pub attribute: Attribute,
    /// The plotted channel.
    pub channel: Channel,
    /// Display unit for the y axis.
    pub unit: &'static str,
    /// Groups that have data for this slice, ignoring the group filter, so a
    /// UI can offer them for selection.
    pub well_groups_with_data: Vec<String>,
}

/// Extract per-group series for one channel/attribute pair.
///
/// `groups` restricts the emitted series; `None` emits every group. When the
/// table carries no group assignments at all, a single "All Data" series is
/// emitted instead.
pub fn chart_series(
    table: &AggregateTable,
    channel: Channel,
    attribute: Attribute,
    groups: Option<&[String]>,
) -> ChartData {
    let slice: Vec<_> = table
        .rows
        .iter()
        .filter(|row| row.channel == channel)
        .collect();

    let mut with_data: Vec<String> = Vec::new();
    for row in &slice {
        let (Some(group), Some(_), true) = (
            row.well_group.as_ref(),
            row.time,
            row.stats.contains_key(&attribute),
        ) else {
            continue;
        };
        if !with_data.contains(group) {
            with_data.push(group.clone());
        }
    }

    let no_groups_at_all = slice.iter().all(|row| row.well_group.is_none());
    let mut datasets = Vec::new();

    if no_groups_at_all {
        let data = collect_points(&slice, attribute, None);
        if !data.is_empty() {
            datasets.push(ChartSeries {
                label: "All Data".to_string(),
                data,
            });
        }
    } else {
        let selected: Vec<String> = match groups {
            Some(filter) => with_data
                .iter()
                .filter(|g| filter.contains(g))
                .cloned()
                .collect(),
            None => with_data.clone(),
        };
        for group in selected {
            let data = collect_points(&slice, attribute, Some(&group));
            if !data.is_empty() {
                datasets.push(ChartSeries { label: group, data });
            }
        }
    }

    ChartData {
        datasets,
        attribute,
        channel,
        unit: attribute.unit(),
        well_groups_with_data: with_data,
    }
}

fn collect_points(
    slice: &[&crate::engine::AggregateRow],
    attribute: Attribute,
    group: Option<&str>,
) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = slice
        .iter()
        .filter(|row| row.well_group.as_deref() == group || group.is_none())
        .filter_map(|row| {
            let x = row.time?;
            let y = row.stats.get(&attribute)?.mean;
            Some(ChartPoint { x, y })
        })
        .collect();
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AggregateRow, AttributeStats};
    use std::collections::{BTreeMap, BTreeSet};

    fn row(group: Option<&str>, time: Option<f64>, channel: Channel, mean: Option<f64>) -> AggregateRow {
        let mut stats = BTreeMap::new();
        if let Some(mean) = mean {
            stats.insert(
                Attribute::Confluency,
                AttributeStats {
                    mean,
                    std_dev: None,
                },
            );
        }
        AggregateRow {
            well_group: group.map(str::to_string),
            time,
            channel,
            stats,
        }
    }

    fn table(rows: Vec<AggregateRow>) -> AggregateTable {
        AggregateTable {
            attributes: BTreeSet::from([Attribute::Confluency]),
            scan_id: None,
            rows,
        }
    }

    #[test]
    fn series_are_per_group_sorted_and_dense() {
        let table = table(vec![
            row(Some("G1"), Some(24.0), Channel::BF, Some(2.0)),
            row(Some("G1"), Some(0.0), Channel::BF, Some(1.0)),
            row(Some("G1"), Some(12.0), Channel::BF, None),
            row(Some("G2"), Some(0.0), Channel::BF, Some(9.0)),
            row(Some("G3"), Some(0.0), Channel::Green, Some(5.0)),
        ]);
        let chart = chart_series(&table, Channel::BF, Attribute::Confluency, None);

        assert_eq!(chart.unit, "%");
        assert_eq!(chart.well_groups_with_data, vec!["G1", "G2"]);
        assert_eq!(chart.datasets.len(), 2);
        let g1 = &chart.datasets[0];
        assert_eq!(g1.label, "G1");
        // Sorted by time, the missing-value bucket dropped.
        assert_eq!(
            g1.data,
            vec![ChartPoint { x: 0.0, y: 1.0 }, ChartPoint { x: 24.0, y: 2.0 }]
        );
    }

    #[test]
    fn group_filter_restricts_datasets_but_not_availability() {
        let table = table(vec![
            row(Some("G1"), Some(0.0), Channel::BF, Some(1.0)),
            row(Some("G2"), Some(0.0), Channel::BF, Some(2.0)),
        ]);
        let filter = vec!["G2".to_string()];
        let chart = chart_series(&table, Channel::BF, Attribute::Confluency, Some(&filter));

        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].label, "G2");
        assert_eq!(chart.well_groups_with_data, vec!["G1", "G2"]);
    }

    #[test]
    fn ungrouped_table_falls_back_to_all_data_series() {
        let table = table(vec![
            row(None, Some(0.0), Channel::BF, Some(1.0)),
            row(None, Some(24.0), Channel::BF, Some(2.0)),
        ]);
        let chart = chart_series(&table, Channel::BF, Attribute::Confluency, None);

        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].label, "All Data");
        assert_eq!(chart.datasets[0].data.len(), 2);
        assert!(chart.well_groups_with_data.is_empty());
    }
}
