use crate::domain::entities::record::CanonicalField;
use crate::domain::header::HeaderKey;

const HEADER_TABLE: &[(&str, CanonicalField)] = &[
    ("quantity", CanonicalField::Quantity),
    ("qty", CanonicalField::Quantity),
    ("productcode", CanonicalField::ProductCode),
    ("sku", CanonicalField::ProductCode),
    ("itemcode", CanonicalField::ProductCode),
    ("accountname", CanonicalField::AccountName),
    ("account", CanonicalField::AccountName),
    ("customer", CanonicalField::AccountName),
    ("description", CanonicalField::Description),
    ("productdescription", CanonicalField::Description),
    ("weightk", CanonicalField::WeightKg),
    ("weightkg", CanonicalField::WeightKg),
    ("weight", CanonicalField::WeightKg),
    ("uom", CanonicalField::Uom),
    ("unit", CanonicalField::Uom),
    ("location", CanonicalField::Location),
    ("binlocation", CanonicalField::Location),
    ("batchno", CanonicalField::BatchNo),
    ("batch", CanonicalField::BatchNo),
    ("lotno", CanonicalField::BatchNo),
    ("expirydate", CanonicalField::ExpiryDate),
    ("expdate", CanonicalField::ExpiryDate),
    ("warehouse", CanonicalField::Warehouse),
    ("reference", CanonicalField::Reference),
    ("ref", CanonicalField::Reference),
    ("orderno", CanonicalField::Reference),
    ("consignee", CanonicalField::Consignee),
    ("receiver", CanonicalField::Consignee),
    ("deliveryaddress", CanonicalField::DeliveryAddress),
    ("address", CanonicalField::DeliveryAddress),
    ("contactnumber", CanonicalField::ContactNumber),
    ("phone", CanonicalField::ContactNumber),
    ("parts", CanonicalField::Parts),
    ("totalparts", CanonicalField::Parts),
];

pub fn canonical_field_for(key: &HeaderKey) -> Option<CanonicalField> {
    HEADER_TABLE
        .iter()
        .find(|(header, _)| *header == key.as_str())
        .map(|(_, field)| *field)
}

pub fn resolve_field_name(name: &str) -> Option<CanonicalField> {
    CanonicalField::from_stored_name(name)
        .or_else(|| canonical_field_for(&crate::domain::header::normalize_header_text(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::header::normalize_header_text;

    #[test]
    fn maps_known_headers_to_store_columns() {
        let cases = [
            ("Quantity", "quantity"),
            ("ProductCode", "productcode"),
            ("AccountName", "Account Name"),
            ("Weight K", "weight_k"),
            ("Batch No.", "batch_no"),
        ];
        for (header, stored) in cases {
            let field = canonical_field_for(&normalize_header_text(header))
                .unwrap_or_else(|| panic!("{header} should be mapped"));
            assert_eq!(field.stored_name(), stored);
        }
    }

    #[test]
    fn unknown_and_empty_keys_are_unmapped() {
        assert_eq!(canonical_field_for(&normalize_header_text("Notes")), None);
        assert_eq!(canonical_field_for(&normalize_header_text("")), None);
    }

    #[test]
    fn every_table_key_is_already_normalized() {
        for (header, _) in HEADER_TABLE {
            assert_eq!(normalize_header_text(header).as_str(), *header);
        }
    }

    #[test]
    fn resolve_field_name_accepts_both_spellings() {
        assert_eq!(resolve_field_name("Account Name"), Some(CanonicalField::AccountName));
        assert_eq!(resolve_field_name("Qty"), Some(CanonicalField::Quantity));
        assert_eq!(resolve_field_name("weight_k"), Some(CanonicalField::WeightKg));
        assert_eq!(resolve_field_name("colour"), None);
    }
}
