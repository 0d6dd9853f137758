use std::collections::BTreeMap;

pub const PAGE_WIDTH_MM: f64 = 101.6;
pub const PAGE_HEIGHT_MM: f64 = 152.4;

const AVERAGE_GLYPH_WIDTH_EM: f64 = 0.5;
const POINTS_PER_MM: f64 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LabelField {
    Consignee,
    Address,
    Contact,
    OrderRef,
    Account,
    Sku,
    Description,
    Qty,
    Weight,
    Parts,
}

impl LabelField {
    pub const ALL: [LabelField; 10] = [
        LabelField::Consignee,
        LabelField::Address,
        LabelField::Contact,
        LabelField::OrderRef,
        LabelField::Account,
        LabelField::Sku,
        LabelField::Description,
        LabelField::Qty,
        LabelField::Weight,
        LabelField::Parts,
    ];

    pub fn all() -> impl Iterator<Item = LabelField> {
        Self::ALL.into_iter()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LabelField::Consignee => "Consignee",
            LabelField::Address => "Address",
            LabelField::Contact => "Contact",
            LabelField::OrderRef => "Order Ref",
            LabelField::Account => "Account",
            LabelField::Sku => "SKU",
            LabelField::Description => "Description",
            LabelField::Qty => "Qty",
            LabelField::Weight => "Weight (kg)",
            LabelField::Parts => "Parts",
        }
    }

    pub fn stored_key(self) -> &'static str {
        match self {
            LabelField::Consignee => "consignee",
            LabelField::Address => "delivery_address",
            LabelField::Contact => "contact_number",
            LabelField::OrderRef => "reference",
            LabelField::Account => "Account Name",
            LabelField::Sku => "productcode",
            LabelField::Description => "description",
            LabelField::Qty => "quantity",
            LabelField::Weight => "weight_k",
            LabelField::Parts => "parts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelRecord {
    values: BTreeMap<LabelField, String>,
}

impl LabelRecord {
    pub fn from_row(row: &BTreeMap<String, String>) -> Self {
        let values = LabelField::all()
            .map(|field| {
                let value = row.get(field.stored_key()).cloned().unwrap_or_default();
                (field, value)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, field: LabelField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn declared_parts(&self) -> Option<u32> {
        let raw = self.get(LabelField::Parts).trim();
        raw.parse::<u32>()
            .ok()
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|value| value.fract() == 0.0 && *value >= 1.0 && *value <= u32::MAX as f64)
                    .map(|value| value as u32)
            })
            .filter(|parts| *parts > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCounter {
    pub position: usize,
    pub total: usize,
}

impl std::fmt::Display for LabelCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.position, self.total)
    }
}

/// `index` is zero-based. The row's declared parts win over the row count.
pub fn counter_for(record: &LabelRecord, index: usize, row_count: usize) -> LabelCounter {
    let total = record
        .declared_parts()
        .map(|parts| parts as usize)
        .unwrap_or(row_count);
    LabelCounter {
        position: index + 1,
        total,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub x_mm: f64,
    pub y_mm: f64,
    pub font_size_pt: f64,
    pub max_width_mm: f64,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelPage {
    pub elements: Vec<TextElement>,
}

struct Slot {
    field: Option<LabelField>,
    x_mm: f64,
    y_mm: f64,
    font_size_pt: f64,
    max_width_mm: f64,
}

// `None` marks the counter slot.
const SLOTS: &[Slot] = &[
    Slot { field: Some(LabelField::Consignee), x_mm: 6.0, y_mm: 14.0, font_size_pt: 16.0, max_width_mm: 90.0 },
    Slot { field: Some(LabelField::Address), x_mm: 6.0, y_mm: 26.0, font_size_pt: 11.0, max_width_mm: 90.0 },
    Slot { field: Some(LabelField::Contact), x_mm: 6.0, y_mm: 48.0, font_size_pt: 10.0, max_width_mm: 90.0 },
    Slot { field: Some(LabelField::OrderRef), x_mm: 6.0, y_mm: 62.0, font_size_pt: 12.0, max_width_mm: 60.0 },
    Slot { field: Some(LabelField::Account), x_mm: 6.0, y_mm: 74.0, font_size_pt: 10.0, max_width_mm: 90.0 },
    Slot { field: Some(LabelField::Sku), x_mm: 6.0, y_mm: 86.0, font_size_pt: 10.0, max_width_mm: 45.0 },
    Slot { field: Some(LabelField::Qty), x_mm: 56.0, y_mm: 86.0, font_size_pt: 10.0, max_width_mm: 40.0 },
    Slot { field: Some(LabelField::Description), x_mm: 6.0, y_mm: 98.0, font_size_pt: 9.0, max_width_mm: 90.0 },
    Slot { field: Some(LabelField::Weight), x_mm: 6.0, y_mm: 120.0, font_size_pt: 10.0, max_width_mm: 45.0 },
    Slot { field: None, x_mm: 56.0, y_mm: 136.0, font_size_pt: 20.0, max_width_mm: 40.0 },
];

pub fn wrap_to_width(text: &str, max_width_mm: f64, font_size_pt: f64) -> Vec<String> {
    let glyph_width_mm = font_size_pt * AVERAGE_GLYPH_WIDTH_EM / POINTS_PER_MM;
    let max_chars = ((max_width_mm / glyph_width_mm).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn layout_page(record: &LabelRecord, counter: LabelCounter) -> LabelPage {
    let elements = SLOTS
        .iter()
        .map(|slot| {
            let text = match slot.field {
                Some(field) => format!("{}: {}", field.display_name(), record.get(field)),
                None => counter.to_string(),
            };
            TextElement {
                x_mm: slot.x_mm,
                y_mm: slot.y_mm,
                font_size_pt: slot.font_size_pt,
                max_width_mm: slot.max_width_mm,
                lines: wrap_to_width(&text, slot.max_width_mm, slot.font_size_pt),
            }
        })
        .collect();
    LabelPage { elements }
}

pub fn layout_labels(records: &[LabelRecord]) -> Vec<LabelPage> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| layout_page(record, counter_for(record, index, records.len())))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::domain::entities::record::CanonicalField;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn resolves_display_fields_with_empty_fallback() {
        let record = LabelRecord::from_row(&row(&[
            ("consignee", "Jane Doe"),
            ("Account Name", "Acme"),
            ("unrelated", "x"),
        ]));

        assert_eq!(record.get(LabelField::Consignee), "Jane Doe");
        assert_eq!(record.get(LabelField::Account), "Acme");
        assert_eq!(record.get(LabelField::Address), "");
        assert_eq!(record.get(LabelField::Parts), "");
    }

    #[test]
    fn every_label_field_reads_its_own_store_column() {
        let keys: BTreeSet<&str> = LabelField::all().map(LabelField::stored_key).collect();
        let names: BTreeSet<&str> = LabelField::all().map(LabelField::display_name).collect();
        assert_eq!(keys.len(), LabelField::ALL.len());
        assert_eq!(names.len(), LabelField::ALL.len());

        for field in LabelField::all() {
            assert!(
                CanonicalField::from_stored_name(field.stored_key()).is_some(),
                "{} reads unknown column {}",
                field.display_name(),
                field.stored_key()
            );
        }
        assert_eq!(LabelField::Address.display_name(), "Address");
        assert_eq!(LabelField::Address.stored_key(), "delivery_address");
        assert_eq!(LabelField::Weight.stored_key(), "weight_k");
    }

    #[test]
    fn counters_fall_back_to_row_count() {
        let records = vec![LabelRecord::default(); 3];
        let counters: Vec<String> = records
            .iter()
            .enumerate()
            .map(|(index, record)| counter_for(record, index, records.len()).to_string())
            .collect();
        assert_eq!(counters, vec!["1 / 3", "2 / 3", "3 / 3"]);
    }

    #[test]
    fn counters_prefer_declared_parts() {
        let record = LabelRecord::from_row(&row(&[("parts", "5")]));
        assert_eq!(counter_for(&record, 1, 2).to_string(), "2 / 5");

        let fractional = LabelRecord::from_row(&row(&[("parts", "2.5")]));
        assert_eq!(counter_for(&fractional, 0, 2).to_string(), "1 / 2");

        let zero = LabelRecord::from_row(&row(&[("parts", "0")]));
        assert_eq!(counter_for(&zero, 0, 4).to_string(), "1 / 4");

        let float_parts = LabelRecord::from_row(&row(&[("parts", "3.0")]));
        assert_eq!(float_parts.declared_parts(), Some(3));
    }

    #[test]
    fn wrap_breaks_on_words_and_keeps_long_words() {
        let lines = wrap_to_width("aaaa bbbb cccc", 10.0, 10.0);
        // 10pt glyphs are ~1.76mm wide, so 5 characters fit.
        assert_eq!(lines, vec!["aaaa", "bbbb", "cccc"]);

        let long = wrap_to_width("abcdefghijklmnop", 10.0, 10.0);
        assert_eq!(long, vec!["abcdefghijklmnop"]);

        assert!(wrap_to_width("   ", 10.0, 10.0).is_empty());
    }

    #[test]
    fn layout_emits_one_page_per_record_with_counter() {
        let records = vec![
            LabelRecord::from_row(&row(&[("consignee", "A")])),
            LabelRecord::from_row(&row(&[("consignee", "B")])),
        ];

        let pages = layout_labels(&records);

        assert_eq!(pages.len(), 2);
        let counter = pages[1]
            .elements
            .last()
            .map(|element| element.lines.join(" "));
        assert_eq!(counter.as_deref(), Some("2 / 2"));
        assert_eq!(pages[0].elements[0].lines, vec!["Consignee: A"]);
    }
}
