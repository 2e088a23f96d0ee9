//! Date and time validation for a visit.
//!
//! `SDATE` must be an ISO date, `STIME` a `HH:MM` clock time, and the
//! combined moment must fall between the start of organized Swedish
//! monitoring and the wall clock. This is the only check in the crate
//! that reads the current time.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;

use super::{MetadataFlag, MetadataQcField, Visit};

/// No oceanographic monitoring data predates 1893.
fn first_valid_moment() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1893, 1, 1)
        .expect("literal date is valid")
        .and_hms_opt(0, 0, 0)
        .expect("literal time is valid")
}

pub(super) fn check(visit: &mut Visit) {
    let now = chrono::Local::now().naive_local();
    let first_valid = first_valid_moment();

    let mut bad_date = false;
    let mut missing_sdate = 0usize;
    let mut missing_stime = 0usize;
    let mut bad_date_formats = Vec::new();
    let mut bad_time_formats = Vec::new();
    let mut dates_in_future = Vec::new();
    let mut dates_too_old = Vec::new();

    for (date_string, time_string) in visit.times() {
        if date_string.is_empty() {
            missing_sdate += 1;
            bad_date = true;
        }
        if time_string.is_empty() {
            missing_stime += 1;
            bad_date = true;
        }

        let time = match NaiveTime::parse_from_str(&time_string, "%H:%M") {
            Ok(time) => Some(time),
            Err(_) => {
                bad_date = true;
                if !time_string.is_empty() {
                    bad_time_formats.push(time_string.clone());
                }
                None
            }
        };

        let date = match NaiveDate::parse_from_str(&date_string, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                bad_date = true;
                if !date_string.is_empty() {
                    bad_date_formats.push(date_string.clone());
                }
                None
            }
        };

        if let (Some(date), Some(time)) = (date, time) {
            let moment = NaiveDateTime::new(date, time);
            if moment > now {
                dates_in_future.push(moment);
                bad_date = true;
            } else if moment < first_valid {
                dates_too_old.push(moment);
                bad_date = true;
            }
        }
    }

    if !bad_date {
        visit.set_flag(MetadataQcField::DateAndTime, MetadataFlag::GoodData);
        return;
    }

    visit.set_flag(MetadataQcField::DateAndTime, MetadataFlag::BadData);
    if missing_sdate > 0 {
        visit.record_issue(
            MetadataQcField::DateAndTime,
            "SDATE",
            format!("Missing in {missing_sdate} samples."),
        );
    }
    if missing_stime > 0 {
        visit.record_issue(
            MetadataQcField::DateAndTime,
            "STIME",
            format!("Missing in {missing_stime} samples."),
        );
    }
    if !bad_date_formats.is_empty() {
        visit.record_issue(
            MetadataQcField::DateAndTime,
            "SDATE",
            format!("Bad date format: {}", bad_date_formats.join(", ")),
        );
    }
    if !bad_time_formats.is_empty() {
        visit.record_issue(
            MetadataQcField::DateAndTime,
            "STIME",
            format!("Bad time format: {}", bad_time_formats.join(", ")),
        );
    }
    for (moments, text) in [
        (&dates_in_future, "Date in future"),
        (&dates_too_old, "Date too old"),
    ] {
        if moments.is_empty() {
            continue;
        }
        let listed = moments.iter().map(|m| m.to_string()).join(", ");
        for column in ["SDATE", "STIME"] {
            visit.record_issue(
                MetadataQcField::DateAndTime,
                column,
                format!("{text}: {listed}"),
            );
        }
    }
}
