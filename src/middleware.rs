//! # Middleware Components
//!
//! Request/response processing shared across handlers: CORS support and
//! validation of upload parameters. Validation runs before anything touches
//! storage, so a rejected request never creates or mutates a record.
//!
//! ## Middleware Types
//!
//! - **CORS Middleware**: Handles cross-origin request support
//! - **Validation Middleware**: Validates period discriminators, document
//!   types, and file sizes

use crate::errors::{AppError, AppResult};
use crate::models::{MaintenanceFrequency, PeriodKey};
use crate::tracker;
use crate::utils::cors_headers;
use worker::*;

/// Middleware for handling Cross-Origin Resource Sharing (CORS) requests.
///
/// The dashboard is served from a different origin than this worker, so every
/// response carries CORS headers and OPTIONS preflights are answered without
/// touching the handlers.
pub struct CorsMiddleware;

impl CorsMiddleware {
    /// Applies CORS headers to an existing response.
    pub fn apply_headers(response: Response) -> Response {
        response.with_headers(cors_headers())
    }

    /// Handles CORS preflight requests (OPTIONS method).
    pub fn handle_preflight() -> Result<Response> {
        Ok(Response::empty()?.with_headers(cors_headers()))
    }
}

/// Document extensions accepted for PPM uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Middleware for validating upload request parameters.
///
/// All validation methods return [`AppResult`] so failures surface as
/// structured `{"error": ...}` responses with 4xx status codes.
pub struct ValidationMiddleware;

impl ValidationMiddleware {
    /// Validates the period discriminator fields of an upload and builds the
    /// targeted [`PeriodKey`].
    ///
    /// The dashboard sends exactly one meaningful discriminator per
    /// frequency: `month` (1-12) for monthly subjects, `quarter` (1-4) for
    /// quarterly ones, and `year` for yearly ones. A `year` accompanying a
    /// monthly or quarterly upload is ignored rather than rejected, and a
    /// yearly upload without an explicit year targets the current year.
    pub fn validate_period_discriminator(
        frequency: MaintenanceFrequency,
        month: Option<u8>,
        quarter: Option<u8>,
        year: Option<i32>,
    ) -> AppResult<PeriodKey> {
        match frequency {
            MaintenanceFrequency::Monthly => {
                let month = month.ok_or(AppError::MissingField {
                    field: "month".to_string(),
                })?;
                if !(1..=12).contains(&month) {
                    return Err(AppError::InvalidField {
                        field: "month".to_string(),
                        reason: "must be between 1 and 12".to_string(),
                    });
                }
                Ok(PeriodKey::Month(month))
            }
            MaintenanceFrequency::Quarterly => {
                let quarter = quarter.ok_or(AppError::MissingField {
                    field: "quarter".to_string(),
                })?;
                if !(1..=4).contains(&quarter) {
                    return Err(AppError::InvalidField {
                        field: "quarter".to_string(),
                        reason: "must be between 1 and 4".to_string(),
                    });
                }
                Ok(PeriodKey::Quarter(quarter))
            }
            MaintenanceFrequency::Yearly => {
                let year = year.unwrap_or_else(tracker::current_year);
                if !(1000..=9999).contains(&year) {
                    return Err(AppError::InvalidField {
                        field: "year".to_string(),
                        reason: "must be a four-digit year".to_string(),
                    });
                }
                Ok(PeriodKey::Year(year))
            }
        }
    }

    /// Validates that an uploaded document has an accepted extension.
    ///
    /// PPM uploads are reports: PDFs or photographed pages. Anything else is
    /// rejected before it reaches the bucket.
    pub fn validate_document_type(file_name: &str) -> AppResult<()> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::InvalidField {
                field: "file".to_string(),
                reason: format!("unsupported document type: {:?}", file_name),
            });
        }

        Ok(())
    }

    /// Validates that a document size is within the configured limit.
    pub fn validate_file_size(size: u64, max_size: u64) -> AppResult<()> {
        if size > max_size {
            return Err(AppError::FileSizeExceeded {
                size,
                max: max_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaintenanceFrequency::{Monthly, Quarterly, Yearly};

    #[test]
    fn monthly_upload_requires_month_in_range() {
        assert_eq!(
            ValidationMiddleware::validate_period_discriminator(Monthly, Some(7), None, Some(2026))
                .unwrap(),
            PeriodKey::Month(7)
        );
        let missing =
            ValidationMiddleware::validate_period_discriminator(Monthly, None, None, Some(2026))
                .unwrap_err();
        assert!(matches!(missing, AppError::MissingField { .. }));
        let out_of_range =
            ValidationMiddleware::validate_period_discriminator(Monthly, Some(13), None, None)
                .unwrap_err();
        assert!(matches!(out_of_range, AppError::InvalidField { .. }));
    }

    #[test]
    fn quarterly_upload_requires_quarter_in_range() {
        assert_eq!(
            ValidationMiddleware::validate_period_discriminator(Quarterly, None, Some(4), None)
                .unwrap(),
            PeriodKey::Quarter(4)
        );
        let err = ValidationMiddleware::validate_period_discriminator(Quarterly, None, Some(5), None)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidField { .. }));
    }

    #[test]
    fn yearly_upload_defaults_to_current_year() {
        let key =
            ValidationMiddleware::validate_period_discriminator(Yearly, None, None, None).unwrap();
        assert_eq!(key, PeriodKey::Year(tracker::current_year()));
    }

    #[test]
    fn yearly_upload_rejects_implausible_years() {
        let err = ValidationMiddleware::validate_period_discriminator(Yearly, None, None, Some(26))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidField { .. }));
    }

    #[test]
    fn document_type_accepts_reports_and_rejects_executables() {
        assert!(ValidationMiddleware::validate_document_type("report.pdf").is_ok());
        assert!(ValidationMiddleware::validate_document_type("scan.JPG").is_ok());
        assert!(ValidationMiddleware::validate_document_type("tool.exe").is_err());
        assert!(ValidationMiddleware::validate_document_type("noextension").is_err());
    }

    #[test]
    fn file_size_is_checked_against_limit() {
        assert!(ValidationMiddleware::validate_file_size(1_048_576, 10_485_760).is_ok());
        let err = ValidationMiddleware::validate_file_size(20, 10).unwrap_err();
        assert!(matches!(err, AppError::FileSizeExceeded { .. }));
    }
}
