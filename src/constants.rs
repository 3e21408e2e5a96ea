//! # Application Constants
//!
//! This module defines application-wide constants used throughout the PPM
//! document storage service. Centralizing constants improves maintainability
//! and reduces the risk of inconsistencies across the codebase.
//!
//! ## Binding Names
//!
//! Constants for Cloudflare Worker bindings that must match wrangler.toml
//! configuration.
//!
//! ## Size Limits
//!
//! Default size limits and constraints for uploaded maintenance documents.

/// Standard KV configuration binding name
pub const STORAGE_CONFIG_KV_NAME: &str = "STORAGE_CONFIG";

/// Standard R2 bucket binding name
pub const STORAGE_BUCKET_NAME: &str = "STORAGE_BUCKET";

/// Standard D1 database binding name for PPM record tracking
pub const PPM_DB_NAME: &str = "PPM_DB";

/// Default maximum document size (25MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 26_214_400;

/// Default base URL used to resolve stored file paths into download URLs
pub const DEFAULT_STATIC_BASE_URL: &str = "https://api.deskassure.example";

/// Check-type tag under which PPM documents are recorded
pub const PPM_CHECK_TYPE: &str = "ppmcheck";

/// Multipart form field carrying the uploaded document(s)
pub const FORM_FILE_FIELD: &str = "file";

/// CORS header for allowed origins
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// CORS header for allowed methods
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// CORS header for allowed headers
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";
