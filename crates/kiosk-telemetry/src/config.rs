//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Identifier of this physical machine
    pub machine_id: String,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "kiosk".to_string(),
            machine_id: "kiosk-00".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KIOSK_SERVICE_NAME`: Service name (default: kiosk)
    /// - `KIOSK_MACHINE_ID`: Machine identifier (default: kiosk-00)
    /// - `KIOSK_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `KIOSK_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `KIOSK_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("KIOSK_SERVICE_NAME").unwrap_or_else(|_| "kiosk".to_string()),

            machine_id: env::var("KIOSK_MACHINE_ID").unwrap_or_else(|_| "kiosk-00".to_string()),

            log_level: env::var("KIOSK_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("KIOSK_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("KIOSK_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Service name qualified with the machine identifier.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.machine_id)
    }
}
