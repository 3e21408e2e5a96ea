//! # Configuration Management
//!
//! Runtime configuration for the PPM document storage service. Configuration
//! is stored in Cloudflare KV under the `"config"` key and loaded at runtime
//! with defaults for every setting, so the worker stays operational when KV
//! is empty or unreachable at deploy time.
//!
//! ## Configuration Options
//!
//! - `database_name`: D1 binding used for PPM record tracking
//! - `max_file_size`: maximum allowed document size in bytes (default: 25MB)
//! - `static_base_url`: base URL stored file paths are resolved against when
//!   producing browser-openable download URLs

use crate::constants::{DEFAULT_MAX_FILE_SIZE, DEFAULT_STATIC_BASE_URL, PPM_DB_NAME};
use serde::{Deserialize, Serialize};
use worker::kv::KvStore;
use worker::{console_log, Result};

/// Configuration for the PPM document storage service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the D1 database binding used for PPM record tracking.
    /// Must match the binding name in wrangler.toml.
    pub database_name: String,

    /// Maximum allowed document size in bytes.
    /// Oversized uploads are rejected before anything touches storage.
    pub max_file_size: u64,

    /// Base URL against which stored file paths are resolved into
    /// download URLs.
    pub static_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_name: PPM_DB_NAME.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            static_base_url: DEFAULT_STATIC_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from KV storage with fallback to defaults.
    ///
    /// Reads the `"config"` key; a missing value falls back to
    /// [`Config::default`], while KV access errors propagate to the caller.
    ///
    /// Expected JSON format in KV storage:
    /// ```json
    /// {
    ///   "database_name": "PPM_DB",
    ///   "max_file_size": 26214400,
    ///   "static_base_url": "https://api.deskassure.example"
    /// }
    /// ```
    pub async fn load(kv: &KvStore) -> Result<Self> {
        match kv.get("config").json().await? {
            Some(config) => {
                console_log!("Configuration loaded from KV storage");
                Ok(config)
            }
            None => {
                console_log!("Config not found in KV, using default");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_standard_bindings() {
        let config = Config::default();
        assert_eq!(config.database_name, PPM_DB_NAME);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config {
            database_name: "PPM_DB".into(),
            max_file_size: 1024,
            static_base_url: "https://files.deskassure.example".into(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
