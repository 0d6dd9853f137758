use std::io::Cursor;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::domain::entities::sheet::{CellValue, RawSheet};

pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(v) => CellValue::Text(v.to_string()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::DateTime(v) => CellValue::Text(v.to_string()),
        Data::DateTimeIso(v) => CellValue::Text(v.to_string()),
        Data::DurationIso(v) => CellValue::Text(v.to_string()),
        Data::Error(v) => CellValue::Text(format!("{v:?}")),
        Data::Empty => CellValue::Empty,
    }
}

pub fn read_first_sheet(bytes: &[u8]) -> Result<RawSheet> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("failed to open workbook")?;

    let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(RawSheet::default());
    };

    let range = workbook
        .worksheet_range(&first_sheet)
        .with_context(|| format!("failed to read sheet: {first_sheet}"))?;

    let rows = range
        .rows()
        .map(|r| r.iter().map(cell_value).collect())
        .collect();

    Ok(RawSheet::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_calamine_cells() {
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(cell_value(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            cell_value(&Data::String("SKU1".to_string())),
            CellValue::from("SKU1")
        );
        assert_eq!(
            cell_value(&Data::DateTimeIso("2025-01-01".to_string())),
            CellValue::from("2025-01-01")
        );
    }

    #[test]
    fn rejects_bytes_that_are_not_a_workbook() {
        assert!(read_first_sheet(b"Quantity,SKU\n5,SKU1\n").is_err());
    }
}
