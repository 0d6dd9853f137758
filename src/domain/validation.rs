use crate::domain::entities::record::{CanonicalField, FieldValue, NormalizedRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityPolicy {
    RequireNumeric,
    PassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFlow {
    Dashboard,
    Inventory,
}

impl UploadFlow {
    pub fn quantity_policy(self) -> QuantityPolicy {
        match self {
            UploadFlow::Dashboard => QuantityPolicy::RequireNumeric,
            UploadFlow::Inventory => QuantityPolicy::PassThrough,
        }
    }
}

pub fn has_numeric_quantity(record: &NormalizedRecord) -> bool {
    record.quantity().is_some_and(f64::is_finite)
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<NormalizedRecord>,
    pub dropped: usize,
}

pub fn apply_quantity_policy(
    records: Vec<NormalizedRecord>,
    policy: QuantityPolicy,
) -> FilterOutcome {
    match policy {
        QuantityPolicy::RequireNumeric => {
            let total = records.len();
            let kept: Vec<NormalizedRecord> =
                records.into_iter().filter(has_numeric_quantity).collect();
            let dropped = total - kept.len();
            FilterOutcome { kept, dropped }
        }
        QuantityPolicy::PassThrough => {
            let kept = records
                .into_iter()
                .map(|mut record| {
                    if record.get(CanonicalField::Quantity).is_none() {
                        record.insert(CanonicalField::Quantity, FieldValue::Number(f64::NAN));
                    }
                    record
                })
                .collect();
            FilterOutcome { kept, dropped: 0 }
        }
    }
}
