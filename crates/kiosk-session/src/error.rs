//! Error types for the kiosk session crate.
//!
//! States never return these: every fault inside a state becomes a prompt
//! and a transition. They surface only while wiring the controller up and
//! from helpers used by adapters.

use crate::domain::{BankError, DeviceError, MoneyError, SessionError};
use thiserror::Error;

/// Kiosk session errors
#[derive(Debug, Error)]
pub enum KioskError {
    /// Device failure
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Bank failure
    #[error(transparent)]
    Bank(#[from] BankError),

    /// Money arithmetic or parsing failure
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Invalid account context
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Rejected controller configuration
    #[error("Invalid session configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Result type for kiosk session operations
pub type KioskResult<T> = Result<T, KioskError>;
