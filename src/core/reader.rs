use crate::config::SheetConfig;
use crate::domain::model::LocationRecord;

/// Where the input columns sit in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub header_rows: usize,
    /// District, name and address occupy this column and the next two.
    pub location_column: usize,
    pub address_column: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_rows: 2,
            location_column: 1,
            address_column: 6,
        }
    }
}

impl From<&SheetConfig> for SheetLayout {
    fn from(config: &SheetConfig) -> Self {
        Self {
            header_rows: config.header_rows,
            location_column: config.location_column,
            address_column: config.address_column,
        }
    }
}

fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(String::as_str)
}

/// One record per data row; short rows yield missing fields.
pub fn read_locations(values: &[Vec<String>], layout: &SheetLayout) -> Vec<LocationRecord> {
    let first = layout.location_column;
    values
        .iter()
        .skip(layout.header_rows)
        .map(|row| {
            LocationRecord::new(
                cell(row, first),
                cell(row, first + 1),
                cell(row, first + 2),
            )
        })
        .collect()
}

/// 地址欄位，缺少的儲存格視為空字串
pub fn read_addresses(values: &[Vec<String>], layout: &SheetLayout) -> Vec<String> {
    values
        .iter()
        .skip(layout.header_rows)
        .map(|row| cell(row, layout.address_column).unwrap_or_default().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_read_locations_skips_headers_and_maps_columns() {
        let values = sheet(&[
            &["Locations"],
            &["#", "District", "Name", "Address"],
            &["1", "North", "City Park", "1 Park Way", "", "", "1 Park Way, Springfield"],
            &["2", "South", "", "9 Elm St"],
            &["3"],
        ]);

        let records = read_locations(&values, &SheetLayout::default());

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            LocationRecord::new(Some("North"), Some("City Park"), Some("1 Park Way"))
        );
        assert_eq!(records[1].name, None);
        assert_eq!(records[1].address.as_deref(), Some("9 Elm St"));
        assert!(!records[2].is_resolvable());
    }

    #[test]
    fn test_read_addresses_pads_short_rows() {
        let values = sheet(&[
            &["Locations"],
            &["#", "District", "Name", "Address", "", "", "Full address"],
            &["1", "", "", "", "", "", "1 Park Way, Springfield"],
            &["2", "South"],
        ]);

        let addresses = read_addresses(&values, &SheetLayout::default());
        assert_eq!(addresses, vec!["1 Park Way, Springfield", ""]);
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let values = sheet(&[&["Locations"], &["#"]]);
        assert!(read_locations(&values, &SheetLayout::default()).is_empty());
        assert!(read_addresses(&values, &SheetLayout::default()).is_empty());
    }
}
