//! # Data Model
//!
//! Core types for periodic preventive-maintenance (PPM) tracking: the
//! maintenance frequency, the tagged period key, and the per-period document
//! record as persisted by the store and consumed by the dashboard.
//!
//! ## Wire Shape
//!
//! The dashboard exchanges records as JSON objects carrying exactly one of
//! `month` (1-12), `quarter` (1-4), or `year` (four-digit), plus a `filePath`
//! that may arrive as either a bare string or an array of strings. Legacy rows
//! with the bare-string form are normalized to an array on deserialization so
//! every query operation sees `Vec<String>`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cadence governing how many reporting periods one maintenance cycle has.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceFrequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl MaintenanceFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceFrequency::Monthly => "monthly",
            MaintenanceFrequency::Quarterly => "quarterly",
            MaintenanceFrequency::Yearly => "yearly",
        }
    }

}

impl fmt::Display for MaintenanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(MaintenanceFrequency::Monthly),
            "quarterly" => Ok(MaintenanceFrequency::Quarterly),
            "yearly" => Ok(MaintenanceFrequency::Yearly),
            other => Err(format!("unknown maintenance frequency: {other:?}")),
        }
    }
}

/// Tagged identifier of one reporting period.
///
/// Exactly one constructor per frequency; equality is derived on the tag and
/// value, which replaces the frequency-conditional field comparisons the
/// dashboard scatters across its views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodKey {
    /// Calendar month, 1-12.
    Month(u8),
    /// Quarter of the year, 1-4.
    Quarter(u8),
    /// Four-digit calendar year.
    Year(i32),
}

impl PeriodKey {
    /// Builds a key from the wire fields, taking the first one set in the
    /// order month, quarter, year. Returns `None` when none is set; such a
    /// record never matches any displayed period slot.
    pub fn from_fields(month: Option<u8>, quarter: Option<u8>, year: Option<i32>) -> Option<Self> {
        if let Some(m) = month {
            Some(PeriodKey::Month(m))
        } else if let Some(q) = quarter {
            Some(PeriodKey::Quarter(q))
        } else {
            year.map(PeriodKey::Year)
        }
    }

    /// Splits the key back into the wire fields (month, quarter, year).
    pub fn into_fields(self) -> (Option<u8>, Option<u8>, Option<i32>) {
        match self {
            PeriodKey::Month(m) => (Some(m), None, None),
            PeriodKey::Quarter(q) => (None, Some(q), None),
            PeriodKey::Year(y) => (None, None, Some(y)),
        }
    }

    /// Whether this key belongs to the period space of the given frequency.
    pub fn matches_frequency(&self, frequency: MaintenanceFrequency) -> bool {
        matches!(
            (self, frequency),
            (PeriodKey::Month(_), MaintenanceFrequency::Monthly)
                | (PeriodKey::Quarter(_), MaintenanceFrequency::Quarterly)
                | (PeriodKey::Year(_), MaintenanceFrequency::Yearly)
        )
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Month(m) => write!(f, "month {m}"),
            PeriodKey::Quarter(q) => write!(f, "quarter {q}"),
            PeriodKey::Year(y) => write!(f, "year {y}"),
        }
    }
}

/// One reporting period's uploaded-document record.
///
/// A record exists only while it holds at least one file path; deleting a
/// record removes every path it holds. At most one record exists per distinct
/// period key, enforced by merge-on-insert in the tracker rather than by the
/// store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "RawPeriodRecord", into = "RawPeriodRecord")]
pub struct PeriodRecord {
    /// Opaque identity assigned by the store, used for deletion.
    pub id: String,
    /// The period this record covers; `None` for malformed rows.
    pub key: Option<PeriodKey>,
    /// Storage locations of the uploaded documents, in upload order.
    pub file_paths: Vec<String>,
}

impl PeriodRecord {
    pub fn new(id: String, key: PeriodKey, file_paths: Vec<String>) -> Self {
        Self {
            id,
            key: Some(key),
            file_paths,
        }
    }
}

/// Wire/storage mirror of [`PeriodRecord`].
#[derive(Serialize, Deserialize, Clone, Debug)]
struct RawPeriodRecord {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quarter: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(rename = "filePath", default)]
    file_path: Option<FilePathField>,
}

/// `filePath` arrives from storage as either a bare string or an array.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(untagged)]
enum FilePathField {
    One(String),
    Many(Vec<String>),
}

impl FilePathField {
    fn into_vec(self) -> Vec<String> {
        match self {
            FilePathField::One(path) => vec![path],
            FilePathField::Many(paths) => paths,
        }
    }
}

impl From<RawPeriodRecord> for PeriodRecord {
    fn from(raw: RawPeriodRecord) -> Self {
        Self {
            id: raw.id,
            key: PeriodKey::from_fields(raw.month, raw.quarter, raw.year),
            file_paths: raw.file_path.map(FilePathField::into_vec).unwrap_or_default(),
        }
    }
}

impl From<PeriodRecord> for RawPeriodRecord {
    fn from(record: PeriodRecord) -> Self {
        let (month, quarter, year) = record
            .key
            .map(PeriodKey::into_fields)
            .unwrap_or((None, None, None));
        Self {
            id: record.id,
            month,
            quarter,
            year,
            file_path: Some(FilePathField::Many(record.file_paths)),
        }
    }
}

/// Per-subject PPM configuration as persisted by the store.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PpmCheck {
    /// Absent or unrecognized frequencies yield an empty period space.
    #[serde(default, deserialize_with = "lenient_frequency")]
    pub frequency: Option<MaintenanceFrequency>,
    #[serde(default)]
    pub pdf: Vec<PeriodRecord>,
}

/// A maintenance subject (a company) and its PPM configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "ppmCheck", default)]
    pub ppm_check: PpmCheck,
}

/// Coverage answer for one period: whether a document exists, and which.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PeriodStatus {
    pub covered: bool,
    #[serde(rename = "filePaths")]
    pub file_paths: Vec<String>,
}

impl PeriodStatus {
    pub fn uncovered() -> Self {
        Self {
            covered: false,
            file_paths: Vec::new(),
        }
    }
}

/// Accepts any string for `frequency` but maps unknown values to `None`
/// instead of failing the whole fetch.
fn lenient_frequency<'de, D>(deserializer: D) -> Result<Option<MaintenanceFrequency>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frequency_parses_case_insensitively() {
        assert_eq!(
            "Monthly".parse::<MaintenanceFrequency>(),
            Ok(MaintenanceFrequency::Monthly)
        );
        assert!("weekly".parse::<MaintenanceFrequency>().is_err());
    }

    #[test]
    fn string_file_path_normalizes_to_array() {
        let bare: PeriodRecord =
            serde_json::from_value(json!({"_id": "r1", "month": 3, "filePath": "a/b.pdf"}))
                .unwrap();
        let array: PeriodRecord =
            serde_json::from_value(json!({"_id": "r1", "month": 3, "filePath": ["a/b.pdf"]}))
                .unwrap();
        assert_eq!(bare, array);
        assert_eq!(bare.file_paths, vec!["a/b.pdf".to_string()]);
    }

    #[test]
    fn record_without_period_fields_has_no_key() {
        let record: PeriodRecord =
            serde_json::from_value(json!({"_id": "r2", "filePath": ["x.pdf"]})).unwrap();
        assert_eq!(record.key, None);
    }

    #[test]
    fn period_field_precedence_is_month_quarter_year() {
        assert_eq!(
            PeriodKey::from_fields(Some(5), Some(2), Some(2026)),
            Some(PeriodKey::Month(5))
        );
        assert_eq!(
            PeriodKey::from_fields(None, Some(2), Some(2026)),
            Some(PeriodKey::Quarter(2))
        );
        assert_eq!(
            PeriodKey::from_fields(None, None, Some(2026)),
            Some(PeriodKey::Year(2026))
        );
    }

    #[test]
    fn record_serializes_with_single_period_field() {
        let record = PeriodRecord::new("r3".into(), PeriodKey::Quarter(4), vec!["q4.pdf".into()]);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["quarter"], 4);
        assert!(value.get("month").is_none());
        assert!(value.get("year").is_none());
        assert_eq!(value["filePath"], json!(["q4.pdf"]));
    }

    #[test]
    fn unknown_frequency_in_config_becomes_none() {
        let check: PpmCheck =
            serde_json::from_value(json!({"frequency": "fortnightly", "pdf": []})).unwrap();
        assert_eq!(check.frequency, None);
    }

    #[test]
    fn key_matches_only_its_own_frequency() {
        assert!(PeriodKey::Month(7).matches_frequency(MaintenanceFrequency::Monthly));
        assert!(!PeriodKey::Month(7).matches_frequency(MaintenanceFrequency::Yearly));
        assert!(PeriodKey::Year(2026).matches_frequency(MaintenanceFrequency::Yearly));
    }
}
