//! # PPM Handlers
//!
//! Handlers for the periodic-maintenance document lifecycle: fetching a
//! subject's configuration, uploading documents for a reporting period,
//! deleting a period's record, answering the coverage grid, and resolving
//! stored paths into download URLs.
//!
//! ## Side-effect ordering
//!
//! Uploads write every document to R2 before the record collection is merged
//! and persisted; deletes remove the stored objects before the record row
//! goes away. A storage failure therefore leaves the record collection
//! untouched and surfaces as a structured error, which is the contract the
//! dashboard relies on.

use serde::Serialize;
use serde_json::json;
use worker::{Env, FormEntry, Request, Response, Url};

use crate::config::Config;
use crate::constants::{FORM_FILE_FIELD, PPM_CHECK_TYPE, STORAGE_BUCKET_NAME};
use crate::database::DatabaseService;
use crate::errors::{AppError, AppResult};
use crate::logging::Logger;
use crate::middleware::ValidationMiddleware;
use crate::models::{Company, MaintenanceFrequency};
use crate::tracker::{self, MergeOutcome};
use crate::utils::{
    generate_record_id, generate_request_id, generate_storage_key, resolve_download_url,
};
use crate::log_data;

/// One row of the coverage grid returned by `GET /ppmstatus/{subjectId}`.
#[derive(Serialize, Debug)]
struct PeriodStatusEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quarter: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    covered: bool,
    #[serde(rename = "filePaths")]
    file_paths: Vec<String>,
    #[serde(rename = "downloadUrls")]
    download_urls: Vec<String>,
}

/// `GET /companies/{id}` - the subject's configuration, PPM records included.
pub async fn get_company(env: &Env, config: &Config, company_id: &str) -> AppResult<Response> {
    let logger = Logger::new(generate_request_id());
    let company = fetch_company(env, config, company_id).await?;

    logger.info(
        "Fetched company configuration",
        log_data!("company_id" => &company.id, "records" => company.ppm_check.pdf.len()),
    );

    Ok(Response::from_json(&company)?)
}

/// `POST /upload/ppmcheck/{subjectId}` - stores one or more documents for a
/// reporting period and merges them into the subject's record collection.
///
/// The multipart body carries the documents under the `file` field plus the
/// period discriminator (`month`, `quarter`, or `year`) matching the
/// subject's frequency. Responds with `{"filePaths": [...]}` on success.
pub async fn upload_ppm_document(
    mut req: Request,
    env: &Env,
    config: &Config,
    subject_id: &str,
) -> AppResult<Response> {
    let logger = Logger::new(generate_request_id());

    let form = req.form_data().await?;
    let month = form_field_number::<u8>(&form, "month")?;
    let quarter = form_field_number::<u8>(&form, "quarter")?;
    let year = form_field_number::<i32>(&form, "year")?;

    let mut company = fetch_company(env, config, subject_id).await?;
    let frequency = configured_frequency(&company)?;
    let key = ValidationMiddleware::validate_period_discriminator(frequency, month, quarter, year)?;

    // Validate and read every part before anything is written, so a bad file
    // in a multi-file upload rejects the whole request.
    let mut pending: Vec<(String, Vec<u8>)> = Vec::new();
    for entry in form.get_all(FORM_FILE_FIELD).unwrap_or_default() {
        let file = match entry {
            FormEntry::File(file) => file,
            FormEntry::Field(_) => {
                return Err(AppError::InvalidField {
                    field: FORM_FILE_FIELD.to_string(),
                    reason: "expected a file part".to_string(),
                })
            }
        };

        let file_name = file.name();
        ValidationMiddleware::validate_document_type(&file_name)?;

        let bytes = file.bytes().await?;
        ValidationMiddleware::validate_file_size(bytes.len() as u64, config.max_file_size)?;

        let storage_key = generate_storage_key(PPM_CHECK_TYPE, subject_id, &file_name);
        pending.push((storage_key, bytes));
    }

    if pending.is_empty() {
        return Err(AppError::MissingField {
            field: FORM_FILE_FIELD.to_string(),
        });
    }

    let bucket = env.bucket(STORAGE_BUCKET_NAME)?;
    let mut stored_paths = Vec::with_capacity(pending.len());
    for (storage_key, bytes) in pending {
        bucket.put(storage_key.as_str(), bytes).execute().await?;
        stored_paths.push(storage_key);
    }

    // Storage succeeded; only now does the record collection change.
    let db = DatabaseService::from_env(env, &config.database_name)?;
    let records = &mut company.ppm_check.pdf;
    let outcome = tracker::record_upload(records, key, generate_record_id(), stored_paths.clone());

    match &outcome {
        MergeOutcome::Inserted { record_id } => {
            let record = tracker::find_record(records, &key)
                .filter(|r| r.id == *record_id)
                .ok_or_else(|| AppError::Internal("merged record missing after insert".into()))?;
            db.insert_record(subject_id, PPM_CHECK_TYPE, record).await?;
        }
        MergeOutcome::Appended { record_id } => {
            let record = tracker::find_record(records, &key)
                .ok_or_else(|| AppError::Internal("merged record missing after append".into()))?;
            db.update_file_paths(record_id, &record.file_paths).await?;
        }
    }

    logger.info(
        "Stored PPM documents",
        log_data!(
            "subject_id" => subject_id,
            "period" => key.to_string(),
            "files" => stored_paths.len(),
            "record_id" => outcome.record_id()
        ),
    );

    Ok(Response::from_json(&json!({ "filePaths": stored_paths }))?)
}

/// `DELETE /deleteFile/{subjectId}/{checkType}/{recordId}` - removes a whole
/// period record and its stored documents.
///
/// Deletion always targets a record identity, never an individual path; a
/// record with several documents loses all of them. An unknown identity is
/// reported as 404 with `{"error": ...}`.
pub async fn delete_ppm_record(
    env: &Env,
    config: &Config,
    subject_id: &str,
    check_type: &str,
    record_id: &str,
) -> AppResult<Response> {
    let logger = Logger::new(generate_request_id());
    let check_type = check_type.to_lowercase();

    let db = DatabaseService::from_env(env, &config.database_name)?;
    let mut records = db.get_records(subject_id, &check_type).await?;
    let record = records
        .iter()
        .find(|r| r.id == record_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("record {record_id}")))?;

    // Stored objects go first; the record row only disappears once the
    // bucket no longer references these paths.
    let bucket = env.bucket(STORAGE_BUCKET_NAME)?;
    for path in &record.file_paths {
        bucket.delete(path.as_str()).await?;
    }

    db.delete_record(subject_id, &check_type, record_id).await?;
    tracker::delete_upload(&mut records, record_id);

    logger.info(
        "Deleted PPM record",
        log_data!(
            "subject_id" => subject_id,
            "record_id" => record_id,
            "files_removed" => record.file_paths.len(),
            "records_remaining" => records.len()
        ),
    );

    Ok(Response::from_json(&json!({
        "message": "File deleted successfully"
    }))?)
}

/// `GET /ppmstatus/{subjectId}` - the coverage grid the dashboard renders:
/// one entry per expected period, flagged covered when at least one document
/// exists, with resolved download URLs.
pub async fn get_ppm_status(env: &Env, config: &Config, subject_id: &str) -> AppResult<Response> {
    let logger = Logger::new(generate_request_id());
    let company = fetch_company(env, config, subject_id).await?;
    let frequency = company.ppm_check.frequency;
    let records = &company.ppm_check.pdf;

    // Records keyed under a previous frequency stay stored but match no slot
    // in the current grid.
    if let Some(freq) = frequency {
        let unreachable = records
            .iter()
            .filter(|r| r.key.map_or(true, |k| !k.matches_frequency(freq)))
            .count();
        if unreachable > 0 {
            logger.warn(
                "Subject has records unreachable under its current frequency",
                log_data!("subject_id" => subject_id, "unreachable" => unreachable),
            );
        }
    }

    let periods: Vec<PeriodStatusEntry> = tracker::periods_for_opt(frequency)
        .into_iter()
        .map(|key| {
            let status = tracker::status_for(records, &key);
            let download_urls = status
                .file_paths
                .iter()
                .map(|p| resolve_download_url(&config.static_base_url, p))
                .collect();
            let (month, quarter, year) = key.into_fields();
            PeriodStatusEntry {
                month,
                quarter,
                year,
                covered: status.covered,
                file_paths: status.file_paths,
                download_urls,
            }
        })
        .collect();

    Ok(Response::from_json(&json!({
        "frequency": frequency.map(|f| f.as_str()),
        "periods": periods
    }))?)
}

/// `PUT /companies/{id}/frequency` - changes a subject's maintenance
/// frequency. Existing records stay in place; those keyed under the previous
/// frequency simply become unreachable in the new period space.
pub async fn update_frequency(
    mut req: Request,
    env: &Env,
    config: &Config,
    company_id: &str,
) -> AppResult<Response> {
    let logger = Logger::new(generate_request_id());

    let body: serde_json::Value = req.json().await.map_err(|_| AppError::InvalidField {
        field: "body".to_string(),
        reason: "expected a JSON object".to_string(),
    })?;
    let frequency: MaintenanceFrequency = body
        .get("frequency")
        .and_then(|v| v.as_str())
        .ok_or(AppError::MissingField {
            field: "frequency".to_string(),
        })?
        .parse()
        .map_err(|reason| AppError::InvalidField {
            field: "frequency".to_string(),
            reason,
        })?;

    // 404 before update keeps the write from inventing subjects.
    fetch_company(env, config, company_id).await?;

    let db = DatabaseService::from_env(env, &config.database_name)?;
    db.update_frequency(company_id, frequency.as_str()).await?;

    logger.info(
        "Updated maintenance frequency",
        log_data!("company_id" => company_id, "frequency" => frequency.as_str()),
    );

    Ok(Response::from_json(&json!({
        "frequency": frequency.as_str()
    }))?)
}

/// `GET /files/{path}` - resolves a stored file path against the static-file
/// base and redirects the browser to it. Backslash separators from legacy
/// rows are normalized along the way.
pub fn download_redirect(config: &Config, stored_path: &str) -> AppResult<Response> {
    if stored_path.is_empty() {
        return Err(AppError::MissingField {
            field: "path".to_string(),
        });
    }

    let target = resolve_download_url(&config.static_base_url, stored_path);
    let url = Url::parse(&target)
        .map_err(|e| AppError::Internal(format!("invalid download URL {target:?}: {e}")))?;

    Ok(Response::redirect(url)?)
}

async fn fetch_company(env: &Env, config: &Config, company_id: &str) -> AppResult<Company> {
    let db = DatabaseService::from_env(env, &config.database_name)?;
    db.get_company(company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("company {company_id}")))
}

fn configured_frequency(company: &Company) -> AppResult<MaintenanceFrequency> {
    company
        .ppm_check
        .frequency
        .ok_or_else(|| AppError::InvalidField {
            field: "frequency".to_string(),
            reason: "subject has no maintenance frequency configured".to_string(),
        })
}

/// Reads an optional numeric field from the multipart form. The dashboard
/// sends period discriminators as plain text fields.
fn form_field_number<T: std::str::FromStr>(
    form: &worker::FormData,
    name: &str,
) -> AppResult<Option<T>> {
    match form.get(name) {
        Some(FormEntry::Field(value)) => {
            value
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| AppError::InvalidField {
                    field: name.to_string(),
                    reason: "must be a valid number".to_string(),
                })
        }
        Some(FormEntry::File(_)) => Err(AppError::InvalidField {
            field: name.to_string(),
            reason: "expected a text field".to_string(),
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodKey, PeriodRecord, PpmCheck};

    fn company_with(frequency: Option<MaintenanceFrequency>) -> Company {
        Company {
            id: "c1".into(),
            name: "Acme Facilities".into(),
            ppm_check: PpmCheck {
                frequency,
                pdf: vec![PeriodRecord::new(
                    "r1".into(),
                    PeriodKey::Month(2),
                    vec!["uploads\\ppmcheck\\c1\\feb.pdf".into()],
                )],
            },
        }
    }

    #[test]
    fn missing_frequency_is_a_validation_error_for_uploads() {
        let company = company_with(None);
        assert!(matches!(
            configured_frequency(&company),
            Err(AppError::InvalidField { .. })
        ));
    }

    #[test]
    fn status_entry_serializes_with_single_period_field() {
        let entry = PeriodStatusEntry {
            month: Some(2),
            quarter: None,
            year: None,
            covered: true,
            file_paths: vec!["a.pdf".into()],
            download_urls: vec!["https://api.example.com/a.pdf".into()],
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["month"], 2);
        assert!(value.get("quarter").is_none());
        assert_eq!(value["filePaths"][0], "a.pdf");
    }
}
