//! # Periodic Record Tracker
//!
//! Pure state logic mapping reporting periods to uploaded-document records
//! for one maintenance subject under one frequency. Handlers call into this
//! module only after the corresponding storage operation has succeeded, so a
//! failed upload or delete never mutates the record collection.
//!
//! ## Guarantees
//!
//! - At most one record exists per distinct period key (merge-on-insert).
//! - A re-upload to a covered period appends its paths after the existing
//!   ones; nothing is replaced and duplicates are kept as-is.
//! - Deletion removes the whole record, never an individual path, and is a
//!   no-op for unknown identities.
//!
//! Concurrent uploads targeting the same period are not sequenced; the last
//! response to apply its merge appends last. See DESIGN.md.

use chrono::{Datelike, Utc};

use crate::models::{MaintenanceFrequency, PeriodKey, PeriodRecord, PeriodStatus};

/// Result of merging an upload into the record collection, telling the caller
/// which persistence operation to mirror it with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Paths were appended to an existing record.
    Appended { record_id: String },
    /// A new record was inserted for a previously uncovered period.
    Inserted { record_id: String },
}

impl MergeOutcome {
    pub fn record_id(&self) -> &str {
        match self {
            MergeOutcome::Appended { record_id } | MergeOutcome::Inserted { record_id } => {
                record_id
            }
        }
    }
}

/// The current calendar year, read from the wall clock at call time.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Expected reporting periods for a frequency, in ascending order.
///
/// Monthly yields months 1-12, quarterly yields quarters 1-4, and yearly
/// yields the single current calendar year. The yearly result is
/// time-dependent and deliberately uncached.
pub fn periods_for(frequency: MaintenanceFrequency) -> Vec<PeriodKey> {
    match frequency {
        MaintenanceFrequency::Monthly => (1..=12).map(PeriodKey::Month).collect(),
        MaintenanceFrequency::Quarterly => (1..=4).map(PeriodKey::Quarter).collect(),
        MaintenanceFrequency::Yearly => vec![PeriodKey::Year(current_year())],
    }
}

/// Like [`periods_for`], but an absent frequency yields an empty period space
/// (nothing rendered, nothing covered).
pub fn periods_for_opt(frequency: Option<MaintenanceFrequency>) -> Vec<PeriodKey> {
    frequency.map(periods_for).unwrap_or_default()
}

/// Finds the record covering `key`, if any.
pub fn find_record<'a>(records: &'a [PeriodRecord], key: &PeriodKey) -> Option<&'a PeriodRecord> {
    records.iter().find(|r| r.key.as_ref() == Some(key))
}

/// Merges newly stored file paths into the collection.
///
/// If a record for `key` already exists its paths are appended to (in upload
/// order, no de-duplication); otherwise a new record is inserted under
/// `new_record_id`. Afterwards exactly one record covers the targeted period.
pub fn record_upload(
    records: &mut Vec<PeriodRecord>,
    key: PeriodKey,
    new_record_id: String,
    new_file_paths: Vec<String>,
) -> MergeOutcome {
    if let Some(existing) = records.iter_mut().find(|r| r.key == Some(key)) {
        existing.file_paths.extend(new_file_paths);
        MergeOutcome::Appended {
            record_id: existing.id.clone(),
        }
    } else {
        records.push(PeriodRecord::new(
            new_record_id.clone(),
            key,
            new_file_paths,
        ));
        MergeOutcome::Inserted {
            record_id: new_record_id,
        }
    }
}

/// Removes the whole record with the given identity, however many file paths
/// it holds. Unknown identities are a no-op; the storage layer in front of
/// this is what reports not-found. Returns whether a record was removed.
pub fn delete_upload(records: &mut Vec<PeriodRecord>, record_id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.id != record_id);
    records.len() != before
}

/// Coverage status for one period: covered iff a matching record exists with
/// at least one file path.
pub fn status_for(records: &[PeriodRecord], key: &PeriodKey) -> PeriodStatus {
    match find_record(records, key) {
        Some(record) if !record.file_paths.is_empty() => PeriodStatus {
            covered: true,
            file_paths: record.file_paths.clone(),
        },
        _ => PeriodStatus::uncovered(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaintenanceFrequency::{Monthly, Quarterly, Yearly};

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn monthly_period_space_is_twelve_ascending_months() {
        let periods = periods_for(Monthly);
        assert_eq!(periods.len(), 12);
        for (i, key) in periods.iter().enumerate() {
            assert_eq!(*key, PeriodKey::Month(i as u8 + 1));
        }
    }

    #[test]
    fn quarterly_period_space_is_four_quarters() {
        assert_eq!(
            periods_for(Quarterly),
            vec![
                PeriodKey::Quarter(1),
                PeriodKey::Quarter(2),
                PeriodKey::Quarter(3),
                PeriodKey::Quarter(4)
            ]
        );
    }

    #[test]
    fn yearly_period_space_is_the_current_year() {
        assert_eq!(periods_for(Yearly), vec![PeriodKey::Year(current_year())]);
    }

    #[test]
    fn missing_frequency_yields_empty_period_space() {
        assert!(periods_for_opt(None).is_empty());
    }

    #[test]
    fn repeat_upload_appends_paths_to_the_same_record() {
        let mut records = Vec::new();
        record_upload(
            &mut records,
            PeriodKey::Quarter(3),
            "r1".into(),
            paths(&["a.pdf"]),
        );
        let outcome = record_upload(
            &mut records,
            PeriodKey::Quarter(3),
            "r2".into(),
            paths(&["b.pdf"]),
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_paths, paths(&["a.pdf", "b.pdf"]));
        assert_eq!(
            outcome,
            MergeOutcome::Appended {
                record_id: "r1".into()
            }
        );
    }

    #[test]
    fn duplicate_paths_are_kept_in_append_order() {
        let mut records = Vec::new();
        record_upload(
            &mut records,
            PeriodKey::Month(2),
            "r1".into(),
            paths(&["same.pdf"]),
        );
        record_upload(
            &mut records,
            PeriodKey::Month(2),
            "r2".into(),
            paths(&["same.pdf"]),
        );
        assert_eq!(records[0].file_paths, paths(&["same.pdf", "same.pdf"]));
    }

    #[test]
    fn upload_never_leaks_into_other_periods() {
        let mut records = Vec::new();
        record_upload(
            &mut records,
            PeriodKey::Quarter(1),
            "r1".into(),
            paths(&["q1.pdf"]),
        );

        assert_eq!(status_for(&records, &PeriodKey::Quarter(2)), PeriodStatus::uncovered());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn first_upload_covers_only_the_targeted_month() {
        let mut records = Vec::new();
        record_upload(
            &mut records,
            PeriodKey::Month(7),
            "r1".into(),
            paths(&["report7.pdf"]),
        );

        let status = status_for(&records, &PeriodKey::Month(7));
        assert!(status.covered);
        assert_eq!(status.file_paths, paths(&["report7.pdf"]));

        for month in (1..=12u8).filter(|m| *m != 7) {
            assert_eq!(
                status_for(&records, &PeriodKey::Month(month)),
                PeriodStatus::uncovered()
            );
        }
    }

    #[test]
    fn delete_removes_the_whole_record() {
        let mut records = vec![PeriodRecord::new(
            "r5".into(),
            PeriodKey::Month(5),
            paths(&["x.pdf", "y.pdf"]),
        )];

        assert!(delete_upload(&mut records, "r5"));
        assert_eq!(
            status_for(&records, &PeriodKey::Month(5)),
            PeriodStatus::uncovered()
        );
        assert!(records.is_empty());
    }

    #[test]
    fn delete_of_unknown_identity_is_a_no_op() {
        let mut records = vec![PeriodRecord::new(
            "r5".into(),
            PeriodKey::Month(5),
            paths(&["x.pdf"]),
        )];
        let snapshot = records.clone();

        assert!(!delete_upload(&mut records, "missing"));
        assert_eq!(records, snapshot);
    }

    #[test]
    fn frequency_switch_changes_the_period_space_without_deleting_records() {
        let mut records = Vec::new();
        record_upload(
            &mut records,
            PeriodKey::Month(4),
            "r1".into(),
            paths(&["april.pdf"]),
        );

        // Under the yearly space the monthly record is unreachable but intact.
        let yearly = periods_for(Yearly);
        assert_eq!(yearly.len(), 1);
        assert_eq!(
            status_for(&records, &yearly[0]),
            PeriodStatus::uncovered()
        );
        assert_eq!(records.len(), 1);
        assert_eq!(periods_for(Monthly).len(), 12);
    }

    #[test]
    fn malformed_record_matches_no_period() {
        let records = vec![PeriodRecord {
            id: "r9".into(),
            key: None,
            file_paths: paths(&["orphan.pdf"]),
        }];
        for key in periods_for(Monthly) {
            assert!(!status_for(&records, &key).covered);
        }
    }

    #[test]
    fn empty_record_reports_uncovered() {
        let records = vec![PeriodRecord {
            id: "r10".into(),
            key: Some(PeriodKey::Quarter(2)),
            file_paths: Vec::new(),
        }];
        assert!(!status_for(&records, &PeriodKey::Quarter(2)).covered);
    }
}
