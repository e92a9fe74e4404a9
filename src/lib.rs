//! # spheroscan - Spheroid Scan Export Processing
//!
//! `spheroscan` ingests the per-well, per-channel, per-timepoint CSV exports
//! of a spheroid-imaging instrument together with a well-to-group metadata
//! source (an experiment-design spreadsheet or a well-group JSON file) and
//! produces two tidy tables:
//!
//! - a **row-level table** with one row per well/time/channel measurement, and
//! - an **aggregated table** with one row per well-group/time/channel and the
//!   mean and sample standard deviation of each observed attribute.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spheroscan::pipeline::process;
//!
//! let output = process("staging/scan42")?;
//! println!("{}", output.report);
//! for row in &output.aggregated.rows {
//!     println!("{:?} t={:?} {}", row.well_group, row.time, row.channel);
//! }
//! # Ok::<(), spheroscan::pipeline::PipelineError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized leaf-first:
//!
//! - [`plate`]: well-label codec ((row, col) ↔ "A1")
//! - [`vocabulary`]: closed channel and attribute vocabularies with units
//! - [`report`]: structured non-fatal diagnostics returned next to results
//! - [`metadata`]: metadata-source resolution (template spreadsheet,
//!   plate-grid spreadsheet, well-group JSON)
//! - [`reader`]: instrument CSV discovery and header normalization
//! - [`engine`]: unpivot, metadata join, channel coalescing, aggregation
//! - [`pipeline`]: the `process` orchestrator
//! - [`chart`]: chart-ready series extraction for host UIs
//! - [`export`]: CSV writers for both result tables
//!
//! ## Error Handling
//!
//! Parse-level anomalies (unknown vocabulary tokens, malformed grid headers,
//! non-numeric cells, disagreeing scan-ID prefixes) degrade to missing data
//! and are collected on the returned [`report::Report`]. Only structural
//! preconditions abort: a missing directory, no supported files, or an
//! ambiguous spreadsheet set. A present-but-partially-missing result is valid
//! output, not a failure.

#![deny(missing_docs)]

pub mod chart;
pub mod engine;
pub mod export;
pub mod metadata;
pub mod pipeline;
pub mod plate;
pub mod reader;
pub mod report;
pub mod vocabulary;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::chart::{chart_series, ChartData, ChartPoint, ChartSeries};
    pub use crate::engine::{
        AggregateRow, AggregateTable, AttributeStats, MeasurementRow, RowTable,
    };
    pub use crate::export::{write_aggregate_table, write_row_table};
    pub use crate::metadata::{MetadataEntry, MetadataError, MetadataTable};
    pub use crate::pipeline::{process, PipelineError, ProcessOutput};
    pub use crate::plate::{parse_well_label, well_label, PlateError};
    pub use crate::reader::{PositionOutcome, ReaderError, SummaryKind, WideTable};
    pub use crate::report::{Diagnostic, Report, Severity};
    pub use crate::vocabulary::{Attribute, Channel, VocabularyError};
}
