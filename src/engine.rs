//! # Reshape-and-Join Engine
//!
//! Turns the reader's normalized wide tables into the two tidy result tables:
//! unpivot to long form, left-join the metadata on well identity, coalesce the
//! attribute tables of each channel, concatenate channels, and aggregate to
//! (Well Group, Time, channel) granularity.
//!
//! Attributes are a closed enum, so each row carries its values in a typed
//! map instead of dynamically discovered columns; untyped descriptive columns
//! from the metadata source live in a separate side list.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::metadata::MetadataTable;
use crate::reader::WideTable;
use crate::vocabulary::{Attribute, Channel};

/// One row-level measurement record: a single well at a single timepoint on a
/// single channel, with every attribute observed for that channel.
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementRow {
    /// Canonical well label.
    pub well: String,
    /// Group assigned by the metadata source, if any.
    pub well_group: Option<String>,
    /// Timepoint; missing when the export cell was non-numeric.
    pub time: Option<f64>,
    /// Imaging channel.
    pub channel: Channel,
    /// Attribute values present for this row; a missing cell is simply absent.
    pub values: BTreeMap<Attribute, f64>,
    /// Extra metadata values, aligned with [`RowTable::extra_columns`].
    pub extra: Vec<Option<String>>,
}

/// The row-level result table.
#[derive(Debug, Clone, Serialize)]
pub struct RowTable {
    /// Attributes observed across all channels, in vocabulary order.
    pub attributes: BTreeSet<Attribute>,
    /// Names of the preserved extra metadata columns.
    pub extra_columns: Vec<String>,
    /// Scan ID shared by the whole dataset, when resolvable.
    pub scan_id: Option<String>,
    /// Rows in channel-concatenation order.
    pub rows: Vec<MeasurementRow>,
}

/// Mean and sample standard deviation of one attribute within a group bucket.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttributeStats {
    /// Mean over contributing wells with a present value.
    pub mean: f64,
    /// Sample standard deviation; missing for a single contributing value.
    pub std_dev: Option<f64>,
}

/// One aggregated record per (Well Group, Time, channel).
#[derive(Debug, Clone, Serialize)]
pub struct AggregateRow {
    /// Group label; missing when the contributing wells had no assignment.
    pub well_group: Option<String>,
    /// Timepoint of the bucket.
    pub time: Option<f64>,
    /// Imaging channel.
    pub channel: Channel,
    /// Per-attribute statistics for attributes with at least one value.
    pub stats: BTreeMap<Attribute, AttributeStats>,
}

/// The aggregated result table.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateTable {
    /// Attributes observed across all channels, in vocabulary order.
    pub attributes: BTreeSet<Attribute>,
    /// Scan ID shared by the whole dataset, when resolvable.
    pub scan_id: Option<String>,
    /// Rows ordered by channel, group, time.
    pub rows: Vec<AggregateRow>,
}

/// Build the row-level table: unpivot every wide table, join metadata, merge
/// same-channel attributes, concatenate channels.
pub fn build_row_table(
    tables: &[WideTable],
    metadata: &MetadataTable,
    scan_id: Option<String>,
) -> RowTable {
    let attributes: BTreeSet<Attribute> = tables.iter().map(|t| t.attribute).collect();
    let mut rows: Vec<MeasurementRow> = Vec::new();

    for channel in Channel::ALL {
        let channel_tables: Vec<&WideTable> =
            tables.iter().filter(|t| t.channel == channel).collect();
        let Some((base, rest)) = channel_tables.split_first() else {
            continue;
        };

        // Unpivot the channel's first table; its (well, time) pairs define
        // the channel's row set (later tables are left-joined onto it).
        let start = rows.len();
        let mut index: HashMap<(String, Option<u64>), usize> = HashMap::new();
        for (well_index, well) in base.wells.iter().enumerate() {
            for (row_index, time) in base.times.iter().enumerate() {
                let mut values = BTreeMap::new();
                if let Some(value) = base.values[row_index][well_index] {
                    values.insert(base.attribute, value);
                }
                index
                    .entry((well.clone(), time.map(f64::to_bits)))
                    .or_insert(rows.len());
                rows.push(MeasurementRow {
                    well: well.clone(),
                    well_group: None,
                    time: *time,
                    channel,
                    values,
                    extra: Vec::new(),
                });
            }
        }

        // Coalesce the remaining attribute tables of this channel.
        for table in rest {
            for (well_index, well) in table.wells.iter().enumerate() {
                for (row_index, time) in table.times.iter().enumerate() {
                    let key = (well.clone(), time.map(f64::to_bits));
                    let (Some(&target), Some(value)) =
                        (index.get(&key), table.values[row_index][well_index])
                    else {
                        continue;
                    };
                    rows[target].values.insert(table.attribute, value);
                }
            }
        }

        // Left-join metadata on well identity; unmatched wells keep missing
        // group and extras.
        for row in &mut rows[start..] {
            match metadata.lookup(&row.well) {
                Some(entry) => {
                    row.well_group = entry.well_group.clone();
                    row.extra = entry.extra.clone();
                    row.extra.resize(metadata.extra_columns.len(), None);
                }
                None => row.extra = vec![None; metadata.extra_columns.len()],
            }
        }
    }

    RowTable {
        attributes,
        extra_columns: metadata.extra_columns.clone(),
        scan_id,
        rows,
    }
}

/// Aggregate the row-level table by (Well Group, Time, channel).
///
/// Rows whose group is missing are kept and bucketed under the missing key;
/// a bucket with a single contributing value has a defined mean and a missing
/// standard deviation.
pub fn aggregate(table: &RowTable) -> AggregateTable {
    type Key = (usize, Option<String>, Option<u64>);
    let mut buckets: HashMap<Key, BTreeMap<Attribute, Vec<f64>>> = HashMap::new();
    let mut times: HashMap<Key, Option<f64>> = HashMap::new();

    for row in &table.rows {
        let channel_order = Channel::ALL
            .iter()
            .position(|c| *c == row.channel)
            .unwrap_or_default();
        let key: Key = (
            channel_order,
            row.well_group.clone(),
            row.time.map(f64::to_bits),
        );
        times.entry(key.clone()).or_insert(row.time);
        let bucket = buckets.entry(key).or_default();
        for (&attribute, &value) in &row.values {
            bucket.entry(attribute).or_default().push(value);
        }
    }

    let mut keys: Vec<Key> = buckets.keys().cloned().collect();
    keys.sort_by(|a, b| {
        (a.0, &a.1)
            .cmp(&(b.0, &b.1))
            .then_with(|| match (times[a], times[b]) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
    });

    let rows = keys
        .into_iter()
        .map(|key| {
            let stats = buckets[&key]
                .iter()
                .map(|(&attribute, values)| (attribute, describe(values)))
                .collect();
            AggregateRow {
                well_group: key.1.clone(),
                time: times[&key],
                channel: Channel::ALL[key.0],
                stats,
            }
        })
        .collect();

    AggregateTable {
        attributes: table.attributes.clone(),
        scan_id: table.scan_id.clone(),
        rows,
    }
}

/// Mean and sample standard deviation of a non-empty value set.
fn describe(values: &[f64]) -> AttributeStats {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() > 1 {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(variance.sqrt())
    } else {
        None
    };
    AttributeStats { mean, std_dev }
}
