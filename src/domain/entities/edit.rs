use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::record::{CanonicalField, FieldValue, NormalizedRecord};

#[derive(Debug, Clone, Default)]
pub struct StagedEdits {
    pub set_fields: BTreeMap<CanonicalField, FieldValue>,
    pub cleared_fields: BTreeSet<CanonicalField>,
}

impl StagedEdits {
    pub fn is_empty(&self) -> bool {
        self.set_fields.is_empty() && self.cleared_fields.is_empty()
    }

    pub fn apply_to(&self, current: &NormalizedRecord) -> NormalizedRecord {
        let mut next = current.clone();
        for field in &self.cleared_fields {
            next.remove(*field);
        }
        for (field, value) in &self.set_fields {
            next.insert(*field, value.clone());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_to_sets_and_clears_fields() {
        let current: NormalizedRecord = [
            (CanonicalField::Quantity, FieldValue::Number(5.0)),
            (CanonicalField::Location, FieldValue::from("A-01")),
        ]
        .into_iter()
        .collect();

        let mut edits = StagedEdits::default();
        edits
            .set_fields
            .insert(CanonicalField::Quantity, FieldValue::Number(7.0));
        edits.cleared_fields.insert(CanonicalField::Location);

        let next = edits.apply_to(&current);

        assert_eq!(next.quantity(), Some(7.0));
        assert!(next.get(CanonicalField::Location).is_none());
        assert_eq!(current.quantity(), Some(5.0), "source record is untouched");
    }
}
