//! Bottom depth validation: no sample can sit at or below the reported
//! water depth.
use super::{MetadataFlag, MetadataQcField, Visit};

pub(super) fn check(visit: &mut Visit) {
    let Ok(depths) = visit.water_depths() else {
        visit.record_issue(
            MetadataQcField::Wadep,
            "DEPH",
            "No sample depths available, water depth not checked",
        );
        return;
    };
    let max_sampled = depths.last().copied().unwrap_or(0.0);

    let wadep: Vec<f64> = visit
        .metadata("WADEP")
        .iter()
        .filter_map(|value| value.trim().parse().ok())
        .collect();
    let Some(shallowest_reported) = wadep.iter().copied().min_by(f64::total_cmp) else {
        visit.record_issue(
            MetadataQcField::Wadep,
            "WADEP",
            "No usable water depth reported",
        );
        return;
    };

    if max_sampled >= shallowest_reported {
        visit.set_flag(MetadataQcField::Wadep, MetadataFlag::BadData);
        visit.record_issue(
            MetadataQcField::Wadep,
            "WADEP",
            format!(
                "Deepest sample at {max_sampled} m is not above the reported water depth \
                 {shallowest_reported} m"
            ),
        );
    } else {
        visit.set_flag(MetadataQcField::Wadep, MetadataFlag::GoodData);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn visit(depths: &[&str], wadep: &str) -> Visit {
        let records = depths
            .iter()
            .map(|deph| {
                IndexMap::from([
                    ("DEPH".to_string(), deph.to_string()),
                    ("WADEP".to_string(), wadep.to_string()),
                ])
            })
            .collect();
        Visit::new(records).unwrap()
    }

    #[test]
    fn test_samples_above_bottom_are_good() {
        let mut v = visit(&["5", "20", "80"], "85");
        check(&mut v);
        assert_eq!(v.qc()[&MetadataQcField::Wadep], MetadataFlag::GoodData);
    }

    #[test]
    fn test_sample_at_bottom_is_bad() {
        let mut v = visit(&["5", "85"], "85");
        check(&mut v);
        assert_eq!(v.qc()[&MetadataQcField::Wadep], MetadataFlag::BadData);
    }

    #[test]
    fn test_sample_below_bottom_is_bad() {
        let mut v = visit(&["90"], "85");
        check(&mut v);
        assert_eq!(v.qc()[&MetadataQcField::Wadep], MetadataFlag::BadData);
    }

    #[test]
    fn test_unusable_wadep_stays_unchecked() {
        let mut v = visit(&["5"], "not a depth");
        check(&mut v);
        assert_eq!(v.qc()[&MetadataQcField::Wadep], MetadataFlag::NoQcPerformed);
        assert!(v.log()[&MetadataQcField::Wadep].contains_key("WADEP"));
    }
}
