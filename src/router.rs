//! # Request Routing and Dispatch
//!
//! Pattern-based routing for the PPM document storage service: CORS
//! preflights are answered immediately, known route groups are dispatched to
//! their handlers, and anything else falls through to 404.
//!
//! ## Supported Routes
//!
//! - `GET /health` - health check endpoint
//! - `GET /companies/{id}` - subject configuration
//! - `PUT /companies/{id}/frequency` - maintenance frequency changes
//! - `POST /upload/ppmcheck/{subjectId}` - document upload for a period
//! - `DELETE /deleteFile/{subjectId}/{checkType}/{recordId}` - record removal
//! - `GET /ppmstatus/{subjectId}` - per-period coverage grid
//! - `GET /files/{path}` - download URL resolution
//! - `OPTIONS *` - CORS preflight requests

use std::sync::Arc;
use worker::*;

use crate::config::Config;
use crate::handlers::*;
use crate::middleware::CorsMiddleware;

/// Handles incoming HTTP requests and routes them to appropriate handlers.
pub async fn handle_request(req: Request, env: Env, config: Arc<Config>) -> Result<Response> {
    // Handle CORS preflight requests early to avoid unnecessary processing
    if req.method() == Method::Options {
        return CorsMiddleware::handle_preflight();
    }

    let url = req.url()?;
    let path = url.path();
    let method = req.method();

    console_log!("Routing request: {} {}", method, path);

    match (method, path) {
        // Health check endpoint for monitoring and load balancer probes
        (Method::Get, "/health") => handle_health_check(req, env).await,

        // Subject configuration and coverage queries
        (Method::Get, path)
            if path.starts_with("/companies/")
                || path.starts_with("/ppmstatus/")
                || path.starts_with("/files/") =>
        {
            handle_ppm_routes(req, env, config).await
        }

        // Document upload for a reporting period
        (Method::Post, path) if path.starts_with("/upload/") => {
            handle_ppm_routes(req, env, config).await
        }

        // Maintenance frequency changes
        (Method::Put, path) if path.starts_with("/companies/") => {
            handle_ppm_routes(req, env, config).await
        }

        // Whole-record deletion
        (Method::Delete, path) if path.starts_with("/deleteFile/") => {
            handle_ppm_routes(req, env, config).await
        }

        // Default 404 handler for unmatched routes
        _ => handle_not_found(req, env).await,
    }
}
