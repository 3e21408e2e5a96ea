//! # Utility Functions
//!
//! Shared helpers for the PPM document storage service: storage key
//! generation, stored-path normalization, download URL resolution, identifier
//! generation, and CORS headers.
//!
//! ## File Organization Strategy
//!
//! Uploaded documents are organized hierarchically so the bucket can be
//! browsed by subject and date:
//!
//! ```text
//! uploads/ppmcheck/{subjectId}/{date}/{fileName}
//! ```
//!
//! Every component is sanitized before it reaches storage to keep path
//! traversal sequences and separator characters out of object keys.

use chrono::Utc;
use uuid::Uuid;
use worker::Headers;

use crate::constants::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN};

/// Generates the storage key for one uploaded maintenance document.
///
/// The key places documents under the check type, the owning subject, and the
/// upload date (YYYYMMDD), ending in the sanitized original filename:
///
/// ```text
/// uploads/ppmcheck/company42/20260830/report.pdf
/// ```
///
/// The returned key doubles as the `filePath` recorded for the period, which
/// is what the dashboard later resolves into a download URL.
pub fn generate_storage_key(check_type: &str, subject_id: &str, file_name: &str) -> String {
    let check_type = sanitize_path_component(check_type);
    let subject = sanitize_path_component(subject_id);
    let file_name = sanitize_filename(file_name);
    let date = Utc::now().format("%Y%m%d").to_string();

    format!("uploads/{}/{}/{}/{}", check_type, subject, date, file_name)
}

/// Sanitizes a path component to prevent traversal and separator injection.
fn sanitize_path_component(component: &str) -> String {
    component
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(50)
        .collect::<String>()
        .to_lowercase()
}

/// Sanitizes a filename while preserving its extension.
fn sanitize_filename(filename: &str) -> String {
    let filename = filename.trim();

    let safe_chars: String = filename
        .chars()
        .filter(|c| !"/\\:*?\"<>|".contains(*c))
        .take(255)
        .collect();

    if safe_chars.is_empty() {
        "unknown".to_string()
    } else {
        safe_chars
    }
}

/// Normalizes a stored file path to forward-slash separators.
///
/// Paths written by older backends use backslashes; the dashboard replaces
/// them before building download links, and this mirrors that behavior on the
/// server side.
pub fn normalize_file_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Resolves a stored file path into a browser-openable URL against the
/// static-file base, normalizing separators and avoiding doubled slashes.
pub fn resolve_download_url(base: &str, path: &str) -> String {
    let normalized = normalize_file_path(path);
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        normalized.trim_start_matches('/')
    )
}

/// Generates the identity for a newly inserted period record.
pub fn generate_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a per-request identifier for log correlation, combining a
/// millisecond timestamp (temporal ordering) with a v4 UUID (uniqueness).
pub fn generate_request_id() -> String {
    let uuid_part = Uuid::new_v4().to_string();
    let timestamp = Utc::now().timestamp_millis();
    format!("{}-{}", timestamp, uuid_part)
}

/// Creates the CORS headers applied to every response.
///
/// The configuration allows all origins for maximum dashboard compatibility;
/// production deployments that need stricter origins change
/// [`CORS_ALLOW_ORIGIN`](crate::constants::CORS_ALLOW_ORIGIN).
pub fn cors_headers() -> Headers {
    let headers = Headers::new();
    // Note: These values are known to be valid
    let _ = headers.set("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN);
    let _ = headers.set("Access-Control-Allow-Methods", CORS_ALLOW_METHODS);
    let _ = headers.set("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_is_sanitized_and_dated() {
        let key = generate_storage_key("ppmcheck", "Company-42", "Q1 report.pdf");
        assert!(key.starts_with("uploads/ppmcheck/company-42/"));
        assert!(key.ends_with("/Q1 report.pdf"));
        assert_eq!(key.matches('/').count(), 4);
    }

    #[test]
    fn filename_sanitization_strips_separators() {
        let key = generate_storage_key("ppmcheck", "c1", "../../evil\\name.pdf");
        assert!(key.ends_with("....evilname.pdf"));
    }

    #[test]
    fn empty_filename_falls_back_to_unknown() {
        let key = generate_storage_key("ppmcheck", "c1", "///");
        assert!(key.ends_with("/unknown"));
    }

    #[test]
    fn backslash_paths_normalize_to_forward_slashes() {
        assert_eq!(
            normalize_file_path("uploads\\ppmcheck\\c1\\a.pdf"),
            "uploads/ppmcheck/c1/a.pdf"
        );
    }

    #[test]
    fn download_url_avoids_doubled_slashes() {
        assert_eq!(
            resolve_download_url("https://api.example.com/", "/uploads\\c1\\a.pdf"),
            "https://api.example.com/uploads/c1/a.pdf"
        );
    }

    #[test]
    fn record_ids_are_unique() {
        assert_ne!(generate_record_id(), generate_record_id());
    }
}
