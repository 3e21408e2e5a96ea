//! # Handlers Module
//!
//! HTTP request handlers for the PPM document storage service. The PPM route
//! group resolves path parameters here and delegates to the handlers in
//! [`ppm`]; every outcome, success or failure, leaves with CORS headers and a
//! JSON body.

use std::sync::Arc;
use worker::*;

use crate::config::Config;
use crate::utils::cors_headers;

pub mod ppm;

/// Dispatches all PPM-related operations to their handlers.
///
/// Routes handled:
/// - `GET /companies/{id}` - subject configuration with PPM records
/// - `PUT /companies/{id}/frequency` - change the maintenance frequency
/// - `POST /upload/ppmcheck/{subjectId}` - upload documents for a period
/// - `DELETE /deleteFile/{subjectId}/{checkType}/{recordId}` - remove a record
/// - `GET /ppmstatus/{subjectId}` - per-period coverage grid
/// - `GET /files/{path}` - redirect to the resolved download URL
pub async fn handle_ppm_routes(req: Request, env: Env, config: Arc<Config>) -> Result<Response> {
    let method = req.method();
    let url = req.url()?;
    let path = url.path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let result = match (method, segments.as_slice()) {
        (Method::Get, ["companies", company_id]) => {
            ppm::get_company(&env, &config, company_id).await
        }
        (Method::Post, ["upload", "ppmcheck", subject_id]) => {
            let subject_id = subject_id.to_string();
            ppm::upload_ppm_document(req, &env, &config, &subject_id).await
        }
        (Method::Put, ["companies", company_id, "frequency"]) => {
            let company_id = company_id.to_string();
            ppm::update_frequency(req, &env, &config, &company_id).await
        }
        (Method::Delete, ["deleteFile", subject_id, check_type, record_id]) => {
            ppm::delete_ppm_record(&env, &config, subject_id, check_type, record_id).await
        }
        (Method::Get, ["ppmstatus", subject_id]) => {
            ppm::get_ppm_status(&env, &config, subject_id).await
        }
        (Method::Get, ["files", rest @ ..]) => ppm::download_redirect(&config, &rest.join("/")),
        _ => {
            return Response::error("Not Found", 404);
        }
    };

    match result {
        Ok(response) => Ok(response.with_headers(cors_headers())),
        Err(app_error) => match app_error.to_response() {
            Ok(response) => Ok(response.with_headers(cors_headers())),
            Err(_) => {
                Response::error("Internal Server Error", 500).map(|r| r.with_headers(cors_headers()))
            }
        },
    }
}

/// Provides a health check endpoint for monitoring and load balancer probes.
pub async fn handle_health_check(_req: Request, _env: Env) -> Result<Response> {
    Response::from_json(&serde_json::json!({
        "status": "healthy",
        "service": "deskassure-ppm-storage",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handles requests to unmatched routes with a 404 Not Found response.
pub async fn handle_not_found(_req: Request, _env: Env) -> Result<Response> {
    Response::error("Not Found", 404)
}
