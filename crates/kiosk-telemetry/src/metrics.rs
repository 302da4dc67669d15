//! Prometheus metrics for the kiosk session controller.
//!
//! All metrics follow the naming convention: `kiosk_<area>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// State machine transitions, labelled by the state entered
    pub static ref STATE_TRANSITIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("kiosk_session_transitions_total", "Total session state transitions"),
        &["state"]
    ).expect("metric creation failed");

    /// Customers that authenticated successfully
    pub static ref SESSIONS_AUTHENTICATED: IntCounter = IntCounter::new(
        "kiosk_session_authenticated_total",
        "Total number of successfully authenticated sessions"
    ).expect("metric creation failed");

    /// Escalations into maintenance mode, labelled by cause
    pub static ref MAINTENANCE_ESCALATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("kiosk_maintenance_escalations_total", "Total escalations to maintenance mode"),
        &["cause"]
    ).expect("metric creation failed");

    /// Compensating credits issued after a dispense fault
    pub static ref COMPENSATING_CREDITS: IntCounterVec = IntCounterVec::new(
        Opts::new("kiosk_bank_compensating_credits_total", "Compensating credits attempted"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Deposits credited by the bank
    pub static ref DEPOSITS_COMMITTED: IntCounter = IntCounter::new(
        "kiosk_deposits_committed_total",
        "Total deposits committed to the bank"
    ).expect("metric creation failed");

    /// Withdrawals physically dispensed
    pub static ref WITHDRAWALS_DISPENSED: IntCounter = IntCounter::new(
        "kiosk_withdrawals_dispensed_total",
        "Total withdrawals dispensed"
    ).expect("metric creation failed");
}

/// Handle to the registry once all collectors are registered.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Render all registered metrics in the text exposition format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        encode_registry(&self.registry)
    }
}

/// Register every collector with [`REGISTRY`].
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(STATE_TRANSITIONS.clone()),
        Box::new(SESSIONS_AUTHENTICATED.clone()),
        Box::new(MAINTENANCE_ESCALATIONS.clone()),
        Box::new(COMPENSATING_CREDITS.clone()),
        Box::new(DEPOSITS_COMMITTED.clone()),
        Box::new(WITHDRAWALS_DISPENSED.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Render [`REGISTRY`] in the text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    encode_registry(&REGISTRY)
}

fn encode_registry(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
