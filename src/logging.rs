//! # Structured Logging
//!
//! Request-scoped structured logging for the PPM document storage service.
//! Each log line is a single JSON object carrying a timestamp, level, the
//! request id, and optional structured data, emitted through the Workers
//! console so log aggregation can parse it downstream.

use chrono::Utc;
use serde_json::json;
use worker::*;

/// Service name stamped on every log line.
const SERVICE_NAME: &str = "deskassure-ppm-storage";

#[derive(Clone, Copy, Debug)]
enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Logger bound to one request, correlating all of its log lines through a
/// shared request id.
pub struct Logger {
    request_id: String,
}

impl Logger {
    /// Create a new Logger instance for the given request id.
    pub fn new(request_id: String) -> Self {
        Self { request_id }
    }

    /// Log an info message with optional structured data.
    pub fn info(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(LogLevel::Info, message, data);
    }

    /// Log a warning message with optional structured data.
    pub fn warn(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(LogLevel::Warn, message, data);
    }

    /// Log an error message with optional structured data.
    pub fn error(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(LogLevel::Error, message, data);
    }

    fn log(&self, level: LogLevel, message: &str, data: Option<serde_json::Value>) {
        let log_data = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level.as_str(),
            "service": SERVICE_NAME,
            "request_id": self.request_id,
            "message": message,
            "data": data
        });

        match level {
            LogLevel::Info => console_log!("{}", log_data),
            LogLevel::Warn => console_warn!("{}", log_data),
            LogLevel::Error => console_error!("{}", log_data),
        }
    }
}

/// Macro to create a JSON object for additional log data
///
/// Usage: log_data!("key1" => "value1", "key2" => 42)
#[macro_export]
macro_rules! log_data {
    ($($key:expr => $value:expr),*) => {
        Some(serde_json::json!({ $($key: $value),* }))
    };
}
