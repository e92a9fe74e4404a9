//! Well-label codec for multi-well plates.
//!
//! Converts between zero-based (row, column) coordinates and the
//! spreadsheet-style labels used as the canonical join key across all tables
//! ("A1" for row 0, column 0).

/// Number of rows on the plates this pipeline handles (A–H).
pub const PLATE_ROWS: usize = 8;

/// Number of columns on the plates this pipeline handles (1–12).
pub const PLATE_COLS: usize = 12;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Errors produced by the well-label codec.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlateError {
    /// Row index past the uppercase alphabet.
    #[error("row index {0} exceeds the plate alphabet (max 25)")]
    RowOutOfRange(usize),

    /// A label that does not match `<RowLetter><ColumnNumber>`.
    #[error("malformed well label: {0:?}")]
    MalformedLabel(String),
}

/// Encode zero-based plate coordinates as a well label.
///
/// Row 0 maps to "A", column 0 renders as "1". Fails only when the row index
/// runs past the 26-letter alphabet.
pub fn well_label(row: usize, col: usize) -> Result<String, PlateError> {
    let letter = *ALPHABET.get(row).ok_or(PlateError::RowOutOfRange(row))?;
    Ok(format!("{}{}", letter as char, col + 1))
}

/// Decode a well label back into zero-based (row, column) coordinates.
pub fn parse_well_label(label: &str) -> Result<(usize, usize), PlateError> {
    let malformed = || PlateError::MalformedLabel(label.to_string());

    let mut chars = label.chars();
    let letter = chars.next().ok_or_else(malformed)?;
    if !letter.is_ascii_uppercase() {
        return Err(malformed());
    }
    let row = (letter as u8 - b'A') as usize;

    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let number: usize = digits.parse().map_err(|_| malformed())?;
    if number == 0 {
        return Err(malformed());
    }
    Ok((row, number - 1))
}

/// The row letters of a standard 96-well plate, in plate order.
pub fn plate_row_letters() -> impl Iterator<Item = char> {
    ALPHABET[..PLATE_ROWS].iter().map(|&b| b as char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn encodes_plate_corners() {
        assert_eq!(well_label(0, 0).unwrap(), "A1");
        assert_eq!(well_label(0, 11).unwrap(), "A12");
        assert_eq!(well_label(7, 0).unwrap(), "H1");
        assert_eq!(well_label(7, 11).unwrap(), "H12");
    }

    #[test]
    fn rejects_rows_past_alphabet() {
        assert!(well_label(25, 0).is_ok());
        assert_eq!(well_label(26, 0), Err(PlateError::RowOutOfRange(26)));
    }

    #[test]
    fn round_trips_all_plate_coordinates() {
        for row in 0..PLATE_ROWS {
            for col in 0..PLATE_COLS {
                let label = well_label(row, col).unwrap();
                assert_eq!(parse_well_label(&label).unwrap(), (row, col));
            }
        }
    }

    #[test]
    fn rejects_malformed_labels() {
        for bad in ["", "A", "1A", "a1", "A0", "A1b"] {
            assert!(parse_well_label(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn plate_labels_are_distinct() {
        let mut seen = HashSet::new();
        for row in 0..PLATE_ROWS {
            for col in 0..PLATE_COLS {
                assert!(seen.insert(well_label(row, col).unwrap()));
            }
        }
        assert_eq!(seen.len(), PLATE_ROWS * PLATE_COLS);
    }

    proptest! {
        #[test]
        fn plate_labels_match_expected_shape(row in 0usize..PLATE_ROWS, col in 0usize..PLATE_COLS) {
            let label = well_label(row, col).unwrap();
            let mut chars = label.chars();
            let letter = chars.next().unwrap();
            prop_assert!(('A'..='H').contains(&letter));
            let number: usize = chars.as_str().parse().unwrap();
            prop_assert!((1..=12).contains(&number));
        }

        #[test]
        fn distinct_coordinates_distinct_labels(
            a in (0usize..PLATE_ROWS, 0usize..PLATE_COLS),
            b in (0usize..PLATE_ROWS, 0usize..PLATE_COLS),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(
                well_label(a.0, a.1).unwrap(),
                well_label(b.0, b.1).unwrap()
            );
        }
    }
}
