//! # DeskAssure PPM Storage - Cloudflare Workers
//!
//! The remote store behind the DeskAssure maintenance dashboard: an HTTP
//! service that keeps periodic preventive-maintenance (PPM) documents in R2,
//! tracks them per reporting period in a D1 database, and answers the
//! coverage queries the dashboard's status grids render.
//!
//! ## Architecture
//!
//! The service follows a modular architecture with clear separation of
//! concerns:
//! - **Router**: Routes incoming requests to appropriate handlers
//! - **Middleware**: Handles CORS and upload validation
//! - **Handlers**: Process the PPM document lifecycle
//! - **Tracker**: Pure period-to-record state logic (merge, delete, status)
//! - **Database**: Persists subjects and period records in D1
//! - **Models**: Define data structures and the dashboard wire shapes
//! - **Utils**: Storage key generation and download URL resolution
//!
//! ## Core Behavior
//!
//! - A reporting period is covered once at least one document is uploaded
//!   for it; repeat uploads append to the same record, never replace it
//! - At most one record exists per period, enforced by merge-on-insert
//! - Deletion removes a whole record and its stored objects
//! - Stored paths tolerate legacy backslash separators and bare-string
//!   `filePath` values
//!
//! ## Example Usage
//!
//! The service exposes a REST API for the dashboard:
//!
//! ```text
//! GET    /companies/{id}                              - Subject configuration
//! POST   /upload/ppmcheck/{subjectId}                 - Upload period documents
//! DELETE /deleteFile/{subjectId}/{checkType}/{recordId} - Delete a record
//! GET    /ppmstatus/{subjectId}                       - Coverage grid
//! GET    /files/{path}                                - Download redirect
//! ```

use std::sync::{Arc, OnceLock};
use worker::*;

mod config;
mod constants;
mod database;
mod errors;
mod handlers;
mod logging;
mod middleware;
mod models;
mod router;
mod tracker;
mod utils;

use config::Config;
use constants::STORAGE_CONFIG_KV_NAME;

static CONFIG_CACHE: OnceLock<Arc<Config>> = OnceLock::new();

/// Main entry point for the Cloudflare Worker.
///
/// Sets up panic handling, loads configuration from KV storage (cached per
/// isolate, with fallback to defaults), and delegates request routing to the
/// router module. All errors are converted to structured HTTP responses with
/// proper status codes before they leave the worker.
#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    // Set up panic hook for better error reporting in development
    console_error_panic_hook::set_once();

    console_log!("Request: {} {}", req.method(), req.url()?.path());

    let config = load_config(&env).await?;

    // Route the request to appropriate handlers
    router::handle_request(req, env, config).await
}

async fn load_config(env: &Env) -> Result<Arc<Config>> {
    if let Some(config) = CONFIG_CACHE.get() {
        return Ok(config.clone());
    }

    let kv = env.kv(STORAGE_CONFIG_KV_NAME)?;
    let config = Arc::new(Config::load(&kv).await?);
    let _ = CONFIG_CACHE.set(config.clone());
    Ok(config)
}
