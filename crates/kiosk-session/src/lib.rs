//! # Kiosk Session Controller
//!
//! Customer session state machine for an unattended cash-handling kiosk.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Drive one customer at a time through authentication, menu navigation and
//! one money-moving operation across devices that complete at real-world
//! latency and fail independently:
//! - Card reader, cash dispenser/acceptor and touch display
//! - Remote bank backend
//!
//! The controller never loses track of inserted cash, never applies a money
//! movement twice, and fails toward maintenance mode rather than guessing.
//!
//! ## Fault Policy
//!
//! | Fault | Policy |
//! |-------|--------|
//! | Hardware | Never retried; escalate to maintenance |
//! | Network | Prompt; back to the safe prior state; never assume applied |
//! | Transaction conflict | "Account changed"; back to the menu |
//! | Unclassified | Most severe outcome applicable in context |
//!
//! ## Module Structure
//!
//! ```text
//! kiosk-session/
//! ├── domain/          # Money, AccountSession, card data, display vocabulary, errors
//! ├── ports/           # SessionControllerApi, CardReader, CashDispenser, TouchDisplay, BankApi
//! ├── adapters/        # BankGateway (optional bank deadline)
//! ├── states/          # One module per session state
//! └── service.rs       # SessionDriver loop
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod states;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use adapters::BankGateway;
pub use domain::{
    AccountNumber, AccountProfile, AccountSession, BankError, CardData, Device, DeviceError,
    ErrorPrompt, Fault, FaultClass, Money, MoneyError, OperationRequest, Pan, Pin, Prompt,
    PromptHandle, PublicAccount, SessionError, SessionToken, View, ViewPayload, ViewResponse,
};
pub use error::{KioskError, KioskResult};
pub use ports::{
    BankApi, CardReader, CashDispenser, SessionControllerApi, SystemClock, TimeSource,
    TouchDisplay,
};
pub use service::{SessionConfig, SessionDriver};
pub use states::{Peripherals, SessionState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
