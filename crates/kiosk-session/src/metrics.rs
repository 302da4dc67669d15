//! # Session Metrics
//!
//! Counters for state transitions and money movements.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! kiosk-session = { path = "...", features = ["metrics"] }
//! ```
//!
//! The counters themselves live in `kiosk-telemetry`. Without the feature
//! every recording function is a no-op.

#[cfg(feature = "metrics")]
use kiosk_telemetry::metric_inc;
#[cfg(feature = "metrics")]
use kiosk_telemetry::{
    COMPENSATING_CREDITS, DEPOSITS_COMMITTED, MAINTENANCE_ESCALATIONS, SESSIONS_AUTHENTICATED,
    STATE_TRANSITIONS, WITHDRAWALS_DISPENSED,
};

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record entry into a state
#[cfg(feature = "metrics")]
pub fn record_transition(state: &str) {
    metric_inc!(STATE_TRANSITIONS, &[state]);
}

/// Record a successful authentication
#[cfg(feature = "metrics")]
pub fn record_authenticated() {
    metric_inc!(SESSIONS_AUTHENTICATED);
}

/// Record an escalation to maintenance with its cause
#[cfg(feature = "metrics")]
pub fn record_maintenance(cause: &str) {
    metric_inc!(MAINTENANCE_ESCALATIONS, &[cause]);
}

/// Record a compensating credit attempt
#[cfg(feature = "metrics")]
pub fn record_compensating_credit(succeeded: bool) {
    let outcome = if succeeded { "credited" } else { "failed" };
    metric_inc!(COMPENSATING_CREDITS, &[outcome]);
}

/// Record a deposit credited by the bank
#[cfg(feature = "metrics")]
pub fn record_deposit_committed() {
    metric_inc!(DEPOSITS_COMMITTED);
}

/// Record cash paid out
#[cfg(feature = "metrics")]
pub fn record_withdrawal_dispensed() {
    metric_inc!(WITHDRAWALS_DISPENSED);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

/// Record entry into a state
#[cfg(not(feature = "metrics"))]
pub fn record_transition(_state: &str) {}

/// Record a successful authentication
#[cfg(not(feature = "metrics"))]
pub fn record_authenticated() {}

/// Record an escalation to maintenance with its cause
#[cfg(not(feature = "metrics"))]
pub fn record_maintenance(_cause: &str) {}

/// Record a compensating credit attempt
#[cfg(not(feature = "metrics"))]
pub fn record_compensating_credit(_succeeded: bool) {}

/// Record a deposit credited by the bank
#[cfg(not(feature = "metrics"))]
pub fn record_deposit_committed() {}

/// Record cash paid out
#[cfg(not(feature = "metrics"))]
pub fn record_withdrawal_dispensed() {}
