//! A1-notation cell ranges used to address the output sheet.

use crate::utils::error::{EnrichError, Result};
use std::fmt;
use std::str::FromStr;

/// Inclusive rectangle of cells. Columns are zero-based, rows one-based,
/// matching how spreadsheets print them (`A1` is column 0, row 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_column: u32,
    pub start_row: u32,
    pub end_column: u32,
    pub end_row: u32,
}

impl CellRange {
    /// Parses `"F3:K3325"` or a single cell such as `"F3"`.
    pub fn parse(text: &str) -> Result<Self> {
        let (start, end) = match text.split_once(':') {
            Some((start, end)) => (start, end),
            None => (text, text),
        };
        let (start_column, start_row) = parse_cell(text, start)?;
        let (end_column, end_row) = parse_cell(text, end)?;

        if end_column < start_column || end_row < start_row {
            return Err(EnrichError::InvalidRange {
                range: text.to_string(),
                reason: "end cell precedes start cell".to_string(),
            });
        }

        Ok(Self {
            start_column,
            start_row,
            end_column,
            end_row,
        })
    }

    /// One row spanning `start_column..=end_column`, e.g. `O3:R3`.
    pub fn row_span(start_column: &str, end_column: &str, row: u32) -> Result<Self> {
        Self::parse(&format!("{start_column}{row}:{end_column}{row}"))
    }

    pub fn width(&self) -> usize {
        (self.end_column - self.start_column + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.end_row - self.start_row + 1) as usize
    }

    pub fn to_a1(&self) -> String {
        format!(
            "{}{}:{}{}",
            column_name(self.start_column),
            self.start_row,
            column_name(self.end_column),
            self.end_row
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for CellRange {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_cell(range: &str, cell: &str) -> Result<(u32, u32)> {
    let invalid = |reason: &str| EnrichError::InvalidRange {
        range: range.to_string(),
        reason: reason.to_string(),
    };

    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| invalid("cell is missing a row number"))?;
    let (letters, digits) = cell.split_at(split);

    let column = column_index(letters).ok_or_else(|| invalid("cell is missing a column"))?;
    let row: u32 = digits
        .parse()
        .map_err(|_| invalid("row must be a positive number"))?;
    if row == 0 {
        return Err(invalid("rows start at 1"));
    }

    Ok((column, row))
}

/// `A` -> 0, `Z` -> 25, `AA` -> 26.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let value = letters.chars().try_fold(0u32, |acc, c| {
        acc.checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
    })?;
    Some(value - 1)
}

pub fn column_name(index: u32) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    name.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_details_range() {
        let range = CellRange::parse("F3:K3325").unwrap();
        assert_eq!(range.start_column, 5);
        assert_eq!(range.end_column, 10);
        assert_eq!(range.start_row, 3);
        assert_eq!(range.end_row, 3325);
        assert_eq!(range.width(), 6);
        assert_eq!(range.height(), 3323);
        assert_eq!(range.to_a1(), "F3:K3325");
    }

    #[test]
    fn test_row_span() {
        let range = CellRange::row_span("O", "R", 42).unwrap();
        assert_eq!(range.to_string(), "O42:R42");
        assert_eq!(range.width(), 4);
        assert_eq!(range.height(), 1);
    }

    #[test]
    fn test_single_cell_and_lowercase() {
        let range: CellRange = "b7".parse().unwrap();
        assert_eq!(range.to_a1(), "B7:B7");
    }

    #[test]
    fn test_rejects_malformed_ranges() {
        assert!(CellRange::parse("").is_err());
        assert!(CellRange::parse("F").is_err());
        assert!(CellRange::parse("3").is_err());
        assert!(CellRange::parse("F0:K2").is_err());
        assert!(CellRange::parse("K3:F3").is_err());
        assert!(CellRange::parse("F3:K2").is_err());
    }

    #[test]
    fn test_multi_letter_columns() {
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("AZ"), Some(51));
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(51), "AZ");
        assert_eq!(column_name(0), "A");
    }
}
