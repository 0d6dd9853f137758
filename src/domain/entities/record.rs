use std::collections::BTreeMap;

use crate::domain::entities::sheet::format_f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i64);

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

impl From<RecordId> for i64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadId(pub i64);

impl From<i64> for UploadId {
    fn from(value: i64) -> Self {
        UploadId(value)
    }
}

/// Destination columns accepted by the inventory store.
///
/// The stored names keep the store's own mixed conventions and must not be
/// renamed: `Account Name` and `weight_k` are the literal column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    Quantity,
    ProductCode,
    AccountName,
    Description,
    WeightKg,
    Uom,
    Location,
    BatchNo,
    ExpiryDate,
    Warehouse,
    Reference,
    Consignee,
    DeliveryAddress,
    ContactNumber,
    Parts,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 15] = [
        CanonicalField::Quantity,
        CanonicalField::ProductCode,
        CanonicalField::AccountName,
        CanonicalField::Description,
        CanonicalField::WeightKg,
        CanonicalField::Uom,
        CanonicalField::Location,
        CanonicalField::BatchNo,
        CanonicalField::ExpiryDate,
        CanonicalField::Warehouse,
        CanonicalField::Reference,
        CanonicalField::Consignee,
        CanonicalField::DeliveryAddress,
        CanonicalField::ContactNumber,
        CanonicalField::Parts,
    ];

    pub fn stored_name(self) -> &'static str {
        match self {
            CanonicalField::Quantity => "quantity",
            CanonicalField::ProductCode => "productcode",
            CanonicalField::AccountName => "Account Name",
            CanonicalField::Description => "description",
            CanonicalField::WeightKg => "weight_k",
            CanonicalField::Uom => "uom",
            CanonicalField::Location => "location",
            CanonicalField::BatchNo => "batch_no",
            CanonicalField::ExpiryDate => "expiry_date",
            CanonicalField::Warehouse => "warehouse",
            CanonicalField::Reference => "reference",
            CanonicalField::Consignee => "consignee",
            CanonicalField::DeliveryAddress => "delivery_address",
            CanonicalField::ContactNumber => "contact_number",
            CanonicalField::Parts => "parts",
        }
    }

    pub fn from_stored_name(name: &str) -> Option<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.stored_name() == name)
    }
}

#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(value) => format_f64(*value),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }
}

// NaN quantities are legitimate stored values, so two NaNs compare equal here.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    fields: BTreeMap<CanonicalField, FieldValue>,
}

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: CanonicalField, value: FieldValue) {
        self.fields.insert(field, value);
    }

    pub fn remove(&mut self, field: CanonicalField) -> Option<FieldValue> {
        self.fields.remove(&field)
    }

    pub fn get(&self, field: CanonicalField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn quantity(&self) -> Option<f64> {
        self.get(CanonicalField::Quantity)
            .and_then(FieldValue::as_f64)
    }

    pub fn fields(&self) -> impl Iterator<Item = (CanonicalField, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_stored_row(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(field, value)| (field.stored_name().to_string(), value.display()))
            .collect()
    }
}

impl FromIterator<(CanonicalField, FieldValue)> for NormalizedRecord {
    fn from_iter<T: IntoIterator<Item = (CanonicalField, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub upload_id: Option<UploadId>,
    pub owner_id: String,
    pub created_at: String,
    pub record: NormalizedRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMeta {
    pub id: UploadId,
    pub owner_id: String,
    pub source_path: String,
    pub token: String,
    pub row_count: i64,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_round_trip() {
        for field in CanonicalField::ALL {
            assert_eq!(CanonicalField::from_stored_name(field.stored_name()), Some(field));
        }
        assert_eq!(CanonicalField::from_stored_name("Quantity"), None);
    }

    #[test]
    fn nan_numbers_compare_equal() {
        assert_eq!(FieldValue::Number(f64::NAN), FieldValue::Number(f64::NAN));
        assert_ne!(FieldValue::Number(1.0), FieldValue::Text("1".to_string()));
    }

    #[test]
    fn stored_row_uses_store_column_names() {
        let record: NormalizedRecord = [
            (CanonicalField::Quantity, FieldValue::Number(5.0)),
            (CanonicalField::AccountName, FieldValue::from("Acme")),
        ]
        .into_iter()
        .collect();

        let row = record.to_stored_row();
        assert_eq!(row.get("quantity").map(String::as_str), Some("5"));
        assert_eq!(row.get("Account Name").map(String::as_str), Some("Acme"));
    }
}
