use crate::plate::PlateError;

/// Errors that can occur while resolving metadata sources.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// I/O error reading a metadata file.
    #[error("failed to read metadata file: {0}")]
    Io(#[from] std::io::Error),

    /// Spreadsheet could not be opened or decoded.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    /// Spreadsheet has no worksheet or no header row.
    #[error("spreadsheet {0} has no usable worksheet")]
    EmptySpreadsheet(String),

    /// More than one spreadsheet in the staging directory; the source cannot
    /// be chosen safely.
    #[error("{0} spreadsheet files found in staging directory, expected exactly one")]
    AmbiguousSpreadsheets(usize),

    /// Well-group JSON could not be decoded.
    #[error("well-group JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A well coordinate in the JSON source is off the plate alphabet.
    #[error("invalid well coordinate: {0}")]
    Plate(#[from] PlateError),
}
