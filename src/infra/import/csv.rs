use anyhow::{Context, Result};

use crate::domain::entities::sheet::{CellValue, RawSheet};

fn text_cell(value: &str) -> CellValue {
    if value.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(value.to_string())
    }
}

pub fn read_csv_sheet(bytes: &[u8]) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(RawSheet::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ragged_rows_and_marks_empty_cells() {
        let sheet = read_csv_sheet(b"Quantity,SKU,Location\n5,SKU1\n,SKU2,A-01\n")
            .expect("should parse csv");

        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[1], vec![CellValue::from("5"), CellValue::from("SKU1")]);
        assert_eq!(sheet.rows[2][0], CellValue::Empty);
        assert_eq!(sheet.rows[2][2], CellValue::from("A-01"));
    }

    #[test]
    fn empty_input_has_no_rows() {
        let sheet = read_csv_sheet(b"").expect("should parse empty csv");
        assert!(sheet.rows.is_empty());
    }
}
