//! Common value validation: every header column must hold exactly one
//! value across a visit.
use itertools::Itertools;

use super::{visit::METADATA_FIELDS, MetadataFlag, MetadataQcField, Visit};

pub(super) fn check(visit: &mut Visit) {
    let multivalued: Vec<&str> = METADATA_FIELDS
        .iter()
        .copied()
        .filter(|field| visit.metadata(field).len() > 1)
        .collect();

    if multivalued.is_empty() {
        visit.set_flag(MetadataQcField::CommonValues, MetadataFlag::GoodData);
        return;
    }

    visit.set_flag(MetadataQcField::CommonValues, MetadataFlag::BadData);
    for field in multivalued {
        let values = visit.metadata(field).into_iter().join(", ");
        visit.record_issue(
            MetadataQcField::CommonValues,
            field,
            format!("More than one value in visit: {values}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn record(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_constant_columns_are_good() {
        let mut visit = Visit::new(vec![
            record(&[("STATN", "FLADEN"), ("WADEP", "85")]),
            record(&[("STATN", "FLADEN"), ("WADEP", "85")]),
        ])
        .unwrap();
        check(&mut visit);
        assert_eq!(
            visit.qc()[&MetadataQcField::CommonValues],
            MetadataFlag::GoodData
        );
    }

    #[test]
    fn test_diverging_column_is_bad_and_logged() {
        let mut visit = Visit::new(vec![
            record(&[("STATN", "FLADEN"), ("WADEP", "85")]),
            record(&[("STATN", "FLADEN"), ("WADEP", "86")]),
        ])
        .unwrap();
        check(&mut visit);
        assert_eq!(
            visit.qc()[&MetadataQcField::CommonValues],
            MetadataFlag::BadData
        );
        assert!(visit.log()[&MetadataQcField::CommonValues].contains_key("WADEP"));
        assert!(!visit.log()[&MetadataQcField::CommonValues].contains_key("STATN"));
    }

    #[test]
    fn test_non_header_columns_are_ignored() {
        // DEPH legitimately varies within a visit.
        let mut visit = Visit::new(vec![record(&[("DEPH", "5")]), record(&[("DEPH", "20")])])
            .unwrap();
        check(&mut visit);
        assert_eq!(
            visit.qc()[&MetadataQcField::CommonValues],
            MetadataFlag::GoodData
        );
    }
}
