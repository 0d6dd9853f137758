use crate::domain::entities::record::{CanonicalField, FieldValue, NormalizedRecord};
use crate::domain::entities::sheet::{CellValue, RawSheet};
use crate::domain::header::{normalize_headers, HeaderKey};
use crate::domain::mapping::canonical_field_for;

#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub records: Vec<NormalizedRecord>,
    pub unmapped_headers: Vec<HeaderKey>,
    pub blank_rows: usize,
}

pub fn parse_quantity(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Number(value) => *value,
        CellValue::Text(text) => parse_leading_number(text),
        CellValue::Empty | CellValue::Bool(_) => f64::NAN,
    }
}

fn parse_leading_number(text: &str) -> f64 {
    let cleaned = text.trim().replace(',', "");
    let candidate: String = cleaned
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .collect();

    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn field_value(field: CanonicalField, cell: &CellValue) -> FieldValue {
    match (field, cell) {
        (CanonicalField::Quantity, _) => FieldValue::Number(parse_quantity(cell)),
        (_, CellValue::Number(value)) => FieldValue::Number(*value),
        (_, other) => FieldValue::Text(other.as_text()),
    }
}

pub fn project_row(row: &[CellValue], header_keys: &[HeaderKey]) -> NormalizedRecord {
    let mut record = NormalizedRecord::new();
    for (key, cell) in header_keys.iter().zip(row.iter()) {
        // Blank cells never write, so a blank duplicate column keeps the earlier value.
        if cell.is_blank() {
            continue;
        }
        let Some(field) = canonical_field_for(key) else {
            continue;
        };
        record.insert(field, field_value(field, cell));
    }
    record
}

pub fn project_sheet(sheet: &RawSheet) -> Projection {
    let Some(header) = sheet.header() else {
        return Projection::default();
    };
    let header_keys = normalize_headers(header);

    let mut unmapped_headers = Vec::new();
    for key in &header_keys {
        if !key.is_empty()
            && canonical_field_for(key).is_none()
            && !unmapped_headers.contains(key)
        {
            unmapped_headers.push(key.clone());
        }
    }

    let mut records = Vec::new();
    let mut blank_rows = 0;
    for row in sheet.data_rows() {
        if row.iter().all(CellValue::is_blank) {
            blank_rows += 1;
            continue;
        }
        records.push(project_row(row, &header_keys));
    }

    Projection {
        records,
        unmapped_headers,
        blank_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::header::normalize_header_text;

    fn keys(headers: &[&str]) -> Vec<HeaderKey> {
        headers.iter().map(|h| normalize_header_text(h)).collect()
    }

    #[test]
    fn projects_known_columns_and_drops_unknown() {
        let header_keys = keys(&["Quantity", "Notes", "ProductCode", "AccountName"]);
        let row = vec![
            CellValue::Number(5.0),
            CellValue::from("fragile"),
            CellValue::from("SKU1"),
            CellValue::from("Acme"),
        ];

        let record = project_row(&row, &header_keys);

        assert_eq!(record.len(), 3);
        assert_eq!(record.quantity(), Some(5.0));
        assert_eq!(
            record.get(CanonicalField::ProductCode),
            Some(&FieldValue::from("SKU1"))
        );
        assert_eq!(
            record.get(CanonicalField::AccountName),
            Some(&FieldValue::from("Acme"))
        );
    }

    #[test]
    fn projected_keys_are_always_canonical() {
        let header_keys = keys(&["Qty", "Colour", "Weight K", "", "Random.Header"]);
        let row = vec![
            CellValue::from("3"),
            CellValue::from("red"),
            CellValue::Number(1.5),
            CellValue::from("orphan"),
            CellValue::from("x"),
        ];

        let record = project_row(&row, &header_keys);
        for (field, _) in record.fields() {
            assert!(CanonicalField::ALL.contains(&field));
        }
        let stored: Vec<String> = record.to_stored_row().into_keys().collect();
        assert_eq!(stored, vec!["quantity".to_string(), "weight_k".to_string()]);
    }

    #[test]
    fn duplicate_targets_last_column_wins() {
        let header_keys = keys(&["SKU", "Product Code"]);
        let row = vec![CellValue::from("first"), CellValue::from("second")];

        let record = project_row(&row, &header_keys);

        assert_eq!(
            record.get(CanonicalField::ProductCode),
            Some(&FieldValue::from("second"))
        );
    }

    #[test]
    fn blank_later_duplicate_keeps_earlier_value() {
        let header_keys = keys(&["SKU", "Product Code"]);
        let row = vec![CellValue::from("first"), CellValue::Empty];

        let record = project_row(&row, &header_keys);

        assert_eq!(
            record.get(CanonicalField::ProductCode),
            Some(&FieldValue::from("first"))
        );

        let blank_text = vec![CellValue::from("first"), CellValue::from("")];
        assert_eq!(
            project_row(&blank_text, &header_keys).get(CanonicalField::ProductCode),
            Some(&FieldValue::from("first"))
        );
    }

    #[test]
    fn short_rows_and_blank_cells_are_omitted() {
        let header_keys = keys(&["Quantity", "Location", "Warehouse"]);
        let row = vec![CellValue::Number(1.0), CellValue::Empty];

        let record = project_row(&row, &header_keys);

        assert_eq!(record.len(), 1);
        assert!(record.get(CanonicalField::Location).is_none());
        assert!(record.get(CanonicalField::Warehouse).is_none());
    }

    #[test]
    fn cells_beyond_header_are_ignored() {
        let header_keys = keys(&["Quantity"]);
        let row = vec![CellValue::Number(1.0), CellValue::from("extra")];
        assert_eq!(project_row(&row, &header_keys).len(), 1);
    }

    #[test]
    fn parse_quantity_is_permissive() {
        assert_eq!(parse_quantity(&CellValue::from("12")), 12.0);
        assert_eq!(parse_quantity(&CellValue::from(" 1,200 ")), 1200.0);
        assert_eq!(parse_quantity(&CellValue::from("12 pcs")), 12.0);
        assert_eq!(parse_quantity(&CellValue::from("-5")), -5.0);
        assert_eq!(parse_quantity(&CellValue::from("0")), 0.0);
        assert_eq!(parse_quantity(&CellValue::from("2.5e1")), 25.0);
        assert_eq!(parse_quantity(&CellValue::from("3e")), 3.0);
        assert!(parse_quantity(&CellValue::from("abc")).is_nan());
        assert!(parse_quantity(&CellValue::from("inf")).is_nan());
        assert!(parse_quantity(&CellValue::Empty).is_nan());
        assert!(parse_quantity(&CellValue::Bool(true)).is_nan());
    }

    #[test]
    fn non_numeric_quantity_becomes_nan() {
        let header_keys = keys(&["Quantity"]);
        let record = project_row(&[CellValue::from("abc")], &header_keys);
        assert!(record.quantity().is_some_and(f64::is_nan));
    }

    #[test]
    fn project_sheet_reports_unmapped_headers_and_skips_blank_rows() {
        let sheet = RawSheet::new(vec![
            vec!["Quantity".into(), "Notes".into(), "notes".into()],
            vec![1.0.into(), "a".into(), "b".into()],
            vec![CellValue::Empty, CellValue::from(""), CellValue::Empty],
            vec![2.0.into()],
        ]);

        let projection = project_sheet(&sheet);

        assert_eq!(projection.records.len(), 2);
        assert_eq!(projection.blank_rows, 1);
        let unmapped: Vec<&str> = projection
            .unmapped_headers
            .iter()
            .map(HeaderKey::as_str)
            .collect();
        assert_eq!(unmapped, vec!["notes"]);
    }
}
