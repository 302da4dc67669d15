//! # Kiosk Configuration
//!
//! Runtime parameters for one machine.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KIOSK_MACHINE_ID` | `kiosk-00` | Machine identifier |
//! | `KIOSK_BANK_TIMEOUT_MS` | unset | Deadline per read-only bank call; unset waits indefinitely |
//! | `KIOSK_DEVICE_DELAY_MS` | `250` | Latency of every simulated device operation |
//! | `KIOSK_SHUTDOWN_GRACE_MS` | `2000` | Time the current state gets to finish on shutdown |
//! | `KIOSK_DEMO_CUSTOMER` | `true` | Play a scripted customer against the simulators |

use kiosk_session::SessionConfig;
use kiosk_telemetry::TelemetryConfig;
use std::time::Duration;
use thiserror::Error;

/// Complete kiosk configuration.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Machine identifier attached to logs.
    pub machine_id: String,
    /// Deadline for each read-only bank call. `None` waits as long as the bank does.
    pub bank_deadline: Option<Duration>,
    /// Latency applied to every simulated device and bank call.
    pub device_delay: Duration,
    /// How long shutdown waits for the controller before aborting it.
    pub shutdown_grace: Duration,
    /// Whether the binary plays a scripted customer.
    pub demo_customer: bool,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            machine_id: "kiosk-00".to_string(),
            bank_deadline: None,
            device_delay: Duration::from_millis(250),
            shutdown_grace: Duration::from_secs(2),
            demo_customer: true,
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// A zero deadline would fail every bank call.
    #[error("Bank deadline must be greater than zero. Unset KIOSK_BANK_TIMEOUT_MS to disable it.")]
    ZeroBankDeadline,

    /// Machine identifier is blank.
    #[error("Machine identifier must not be empty")]
    EmptyMachineId,
}

impl KioskConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's raw
    /// value if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.telemetry = TelemetryConfig::from_env();

        if let Some(id) = lookup("KIOSK_MACHINE_ID") {
            config.machine_id = id;
        }
        if let Some(ms) = parse_millis(&lookup, "KIOSK_BANK_TIMEOUT_MS")? {
            config.bank_deadline = Some(ms);
        }
        if let Some(ms) = parse_millis(&lookup, "KIOSK_DEVICE_DELAY_MS")? {
            config.device_delay = ms;
        }
        if let Some(ms) = parse_millis(&lookup, "KIOSK_SHUTDOWN_GRACE_MS")? {
            config.shutdown_grace = ms;
        }
        if let Some(raw) = lookup("KIOSK_DEMO_CUSTOMER") {
            config.demo_customer = match raw.to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "KIOSK_DEMO_CUSTOMER",
                        value: raw,
                    })
                }
            };
        }
        config.telemetry.machine_id = config.machine_id.clone();

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the controller cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bank_deadline == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroBankDeadline);
        }
        if self.machine_id.trim().is_empty() {
            return Err(ConfigError::EmptyMachineId);
        }
        Ok(())
    }

    /// Settings handed to the session driver.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            bank_deadline: self.bank_deadline,
            machine_id: self.machine_id.clone(),
        }
    }
}

fn parse_millis<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}
