//! # Domain Errors
//!
//! Failures reported by the kiosk's collaborators and the classification
//! that decides how a session reacts to them.
//!
//! | Class | Source | Default reaction |
//! |-------|--------|------------------|
//! | Hardware | card reader / dispenser mechanics | maintenance mode |
//! | Network | bank unreachable or deadline elapsed | prompt, safe prior state |
//! | TransactionConflict | bank optimistic-concurrency rejection | "account changed", menu |
//! | Unclassified | anything else | most severe applicable outcome |

use std::fmt;
use thiserror::Error;

/// Physical device that reported a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Device {
    /// Card reader.
    CardReader,
    /// Cash dispenser / acceptor.
    Dispenser,
    /// Touch display.
    Display,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Device::CardReader => "card reader",
            Device::Dispenser => "dispenser",
            Device::Display => "display",
        };
        f.write_str(name)
    }
}

/// Failure reported by a physical device.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// Mechanical failure. Never retried automatically.
    #[error("Hardware fault on {device}: {reason}")]
    Hardware {
        /// Device that failed
        device: Device,
        /// Driver-supplied description
        reason: String,
    },

    /// Any other failure surfaced by the driver.
    #[error("Unexpected failure on {device}: {reason}")]
    Unexpected {
        /// Device that failed
        device: Device,
        /// Driver-supplied description
        reason: String,
    },
}

impl DeviceError {
    /// Mechanical failure on `device`.
    pub fn hardware(device: Device, reason: impl Into<String>) -> Self {
        DeviceError::Hardware {
            device,
            reason: reason.into(),
        }
    }

    /// Non-mechanical failure on `device`.
    pub fn unexpected(device: Device, reason: impl Into<String>) -> Self {
        DeviceError::Unexpected {
            device,
            reason: reason.into(),
        }
    }

    /// Device that reported the failure.
    pub fn device(&self) -> Device {
        match self {
            DeviceError::Hardware { device, .. } | DeviceError::Unexpected { device, .. } => {
                *device
            }
        }
    }
}

/// Failure reported by the bank backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BankError {
    /// Bank unreachable, or the call exceeded its deadline.
    #[error("Bank unreachable: {0}")]
    Network(String),

    /// Account state changed since it was last read.
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// Any other rejection.
    #[error("Bank request failed: {0}")]
    Other(String),
}

/// Money arithmetic and validation errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// Amount entered was zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositive(i128),

    /// Addition exceeded the representable range.
    #[error("Money overflow")]
    Overflow,

    /// Subtraction would go below zero.
    #[error("Money underflow")]
    Underflow,

    /// Not a decimal count of minor units.
    #[error("Invalid money amount: {0}")]
    Parse(String),
}

/// Violations of the session account context invariants.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Remaining limit above the period limit.
    #[error("Remaining limit {remaining} exceeds period limit {limit}")]
    LimitInvariant {
        /// Period limit
        limit: String,
        /// Remaining limit reported
        remaining: String,
    },

    /// Bank returned an empty account identifier.
    #[error("Account number is empty")]
    EmptyAccountNumber,
}

/// How a collaborator failure is treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultClass {
    /// Mechanical failure.
    Hardware,
    /// Bank unreachable.
    Network,
    /// Bank-side optimistic-concurrency rejection.
    TransactionConflict,
    /// Anything else.
    Unclassified,
}

impl FaultClass {
    /// Label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultClass::Hardware => "hardware",
            FaultClass::Network => "network",
            FaultClass::TransactionConflict => "transaction_conflict",
            FaultClass::Unclassified => "unclassified",
        }
    }
}

/// Classification of collaborator errors.
pub trait Fault: std::error::Error {
    /// Where this error falls in the fault taxonomy.
    fn class(&self) -> FaultClass;
}

impl Fault for DeviceError {
    fn class(&self) -> FaultClass {
        match self {
            DeviceError::Hardware { .. } => FaultClass::Hardware,
            DeviceError::Unexpected { .. } => FaultClass::Unclassified,
        }
    }
}

impl Fault for BankError {
    fn class(&self) -> FaultClass {
        match self {
            BankError::Network(_) => FaultClass::Network,
            BankError::TransactionConflict(_) => FaultClass::TransactionConflict,
            BankError::Other(_) => FaultClass::Unclassified,
        }
    }
}
