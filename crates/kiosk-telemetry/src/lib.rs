//! # Kiosk Telemetry
//!
//! Logging and metrics for the kiosk session controller.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an env filter, plain or JSON output
//! - **Metrics**: Prometheus counters for session outcomes, rendered in the
//!   text exposition format on demand
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiosk_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Session controller runs here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KIOSK_SERVICE_NAME` | `kiosk` | Service name, qualified with the machine id |
//! | `KIOSK_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `KIOSK_JSON_LOGS` | `false` | Emit JSON lines instead of text |
//! | `KIOSK_MACHINE_ID` | `kiosk-00` | Machine identifier attached to logs |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingHandle};
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, COMPENSATING_CREDITS, DEPOSITS_COMMITTED,
    MAINTENANCE_ESCALATIONS, REGISTRY, SESSIONS_AUTHENTICATED, STATE_TRANSITIONS,
    WITHDRAWALS_DISPENSED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A collector could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// A configuration value was rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let logging = init_logging(&config)?;

    tracing::info!(
        service = %config.full_service_name(),
        machine_id = %config.machine_id,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        _logging: logging,
        metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingHandle,
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    /// Handle to the metrics registry.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}

/// Log an event tagged with the emitting component.
///
/// ```rust,ignore
/// kiosk_telemetry::log_event!(info, "runtime", "Simulated bank seeded", accounts = 3);
/// ```
#[macro_export]
macro_rules! log_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
}

/// Increment a counter, optionally by label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
