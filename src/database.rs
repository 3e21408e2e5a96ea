//! # D1 Database Service
//!
//! Persistence for maintenance subjects and their per-period document records
//! using Cloudflare D1.
//!
//! ## Database Schema
//!
//! Two tables (see `migrations/0001_init.sql`):
//! - `companies`: maintenance subjects and their configured PPM frequency
//! - `ppm_records`: one row per period that has uploaded documents, with the
//!   period discriminator spread across nullable `month`/`quarter`/`year`
//!   columns and `file_paths` stored as JSON text
//!
//! The store does not enforce per-period uniqueness; the tracker's
//! merge-on-insert does. Legacy rows whose `file_paths` column holds a bare
//! path instead of a JSON array are tolerated and normalized on read.

use serde::Deserialize;
use worker::wasm_bindgen::JsValue;
use worker::{D1Database, Env};

use crate::errors::{AppError, AppResult};
use crate::models::{Company, PeriodKey, PeriodRecord, PpmCheck};

/// Database service for PPM record operations using D1.
pub struct DatabaseService {
    db: D1Database,
}

#[derive(Deserialize)]
struct CompanyRow {
    id: String,
    name: String,
    ppm_frequency: Option<String>,
}

#[derive(Deserialize)]
struct RecordRow {
    id: String,
    month: Option<u8>,
    quarter: Option<u8>,
    year: Option<i32>,
    file_paths: Option<String>,
}

impl RecordRow {
    fn into_record(self) -> PeriodRecord {
        PeriodRecord {
            id: self.id,
            key: PeriodKey::from_fields(self.month, self.quarter, self.year),
            file_paths: self.file_paths.map(parse_file_paths).unwrap_or_default(),
        }
    }
}

/// Parses the `file_paths` column, accepting a JSON array or a legacy bare
/// path string.
fn parse_file_paths(raw: String) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(paths) => paths,
        Err(_) if raw.is_empty() => Vec::new(),
        Err(_) => vec![raw],
    }
}

impl DatabaseService {
    /// Resolves the D1 binding named in the configuration.
    pub fn from_env(env: &Env, binding: &str) -> AppResult<Self> {
        Ok(Self {
            db: env.d1(binding)?,
        })
    }

    /// Fetches a subject and its PPM configuration, records included.
    pub async fn get_company(&self, company_id: &str) -> AppResult<Option<Company>> {
        let row: Option<CompanyRow> = self
            .db
            .prepare("SELECT id, name, ppm_frequency FROM companies WHERE id = ?1")
            .bind(&[JsValue::from_str(company_id)])?
            .first(None)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let records = self
            .get_records(company_id, crate::constants::PPM_CHECK_TYPE)
            .await?;

        Ok(Some(Company {
            id: row.id,
            name: row.name,
            ppm_check: PpmCheck {
                frequency: row.ppm_frequency.and_then(|f| f.parse().ok()),
                pdf: records,
            },
        }))
    }

    /// Fetches every period record for a subject under one check type, in
    /// insertion order.
    pub async fn get_records(
        &self,
        company_id: &str,
        check_type: &str,
    ) -> AppResult<Vec<PeriodRecord>> {
        let result = self
            .db
            .prepare(
                "SELECT id, month, quarter, year, file_paths FROM ppm_records \
                 WHERE company_id = ?1 AND check_type = ?2 ORDER BY rowid",
            )
            .bind(&[JsValue::from_str(company_id), JsValue::from_str(check_type)])?
            .all()
            .await?;

        let rows: Vec<RecordRow> = result.results()?;
        Ok(rows.into_iter().map(RecordRow::into_record).collect())
    }

    /// Inserts a new period record.
    pub async fn insert_record(
        &self,
        company_id: &str,
        check_type: &str,
        record: &PeriodRecord,
    ) -> AppResult<()> {
        let (month, quarter, year) = record
            .key
            .map(PeriodKey::into_fields)
            .unwrap_or((None, None, None));
        let file_paths = serde_json::to_string(&record.file_paths)
            .map_err(|e| AppError::Database(format!("failed to encode file paths: {e}")))?;

        self.db
            .prepare(
                "INSERT INTO ppm_records (id, company_id, check_type, month, quarter, year, file_paths) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&[
                JsValue::from_str(&record.id),
                JsValue::from_str(company_id),
                JsValue::from_str(check_type),
                month.map(|m| JsValue::from_f64(m as f64)).unwrap_or(JsValue::NULL),
                quarter.map(|q| JsValue::from_f64(q as f64)).unwrap_or(JsValue::NULL),
                year.map(|y| JsValue::from_f64(y as f64)).unwrap_or(JsValue::NULL),
                JsValue::from_str(&file_paths),
            ])?
            .run()
            .await?;

        Ok(())
    }

    /// Replaces a record's file paths with the merged list.
    pub async fn update_file_paths(
        &self,
        record_id: &str,
        file_paths: &[String],
    ) -> AppResult<()> {
        let encoded = serde_json::to_string(file_paths)
            .map_err(|e| AppError::Database(format!("failed to encode file paths: {e}")))?;

        self.db
            .prepare("UPDATE ppm_records SET file_paths = ?1 WHERE id = ?2")
            .bind(&[JsValue::from_str(&encoded), JsValue::from_str(record_id)])?
            .run()
            .await?;

        Ok(())
    }

    /// Deletes a whole record row, however many file paths it holds.
    pub async fn delete_record(
        &self,
        company_id: &str,
        check_type: &str,
        record_id: &str,
    ) -> AppResult<()> {
        self.db
            .prepare(
                "DELETE FROM ppm_records WHERE id = ?1 AND company_id = ?2 AND check_type = ?3",
            )
            .bind(&[
                JsValue::from_str(record_id),
                JsValue::from_str(company_id),
                JsValue::from_str(check_type),
            ])?
            .run()
            .await?;

        Ok(())
    }

    /// Updates a subject's maintenance frequency. Records keyed under the
    /// previous frequency stay in place; they become unreachable under the
    /// new period space rather than being deleted.
    pub async fn update_frequency(&self, company_id: &str, frequency: &str) -> AppResult<()> {
        self.db
            .prepare("UPDATE companies SET ppm_frequency = ?1 WHERE id = ?2")
            .bind(&[JsValue::from_str(frequency), JsValue::from_str(company_id)])?
            .run()
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_paths_column_accepts_json_array() {
        assert_eq!(
            parse_file_paths(r#"["a.pdf","b.pdf"]"#.into()),
            vec!["a.pdf".to_string(), "b.pdf".to_string()]
        );
    }

    #[test]
    fn file_paths_column_accepts_legacy_bare_path() {
        assert_eq!(
            parse_file_paths("uploads\\ppmcheck\\c1\\a.pdf".into()),
            vec!["uploads\\ppmcheck\\c1\\a.pdf".to_string()]
        );
    }

    #[test]
    fn empty_file_paths_column_yields_no_paths() {
        assert!(parse_file_paths(String::new()).is_empty());
    }

    #[test]
    fn record_row_without_period_columns_has_no_key() {
        let row = RecordRow {
            id: "r1".into(),
            month: None,
            quarter: None,
            year: None,
            file_paths: Some(r#"["x.pdf"]"#.into()),
        };
        assert_eq!(row.into_record().key, None);
    }
}
