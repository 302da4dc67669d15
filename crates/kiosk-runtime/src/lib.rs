//! # Kiosk Runtime Library
//!
//! Wires the session controller to simulated devices and an in-memory bank.
//! The main entry point is the `main.rs` binary; the library is exposed for
//! the whole-session test suite.
//!
//! ## Module Structure
//!
//! - `adapters/` - Simulated card reader, dispenser, display and bank
//! - `container/` - Configuration and device container
//! - `runtime.rs` - Controller task lifecycle and shutdown
//! - `demo.rs` - Seed data and a scripted customer

#![warn(missing_docs)]

pub mod adapters;
pub mod container;
pub mod demo;
pub mod runtime;

pub use container::{ConfigError, KioskConfig, KioskContainer};
pub use runtime::{KioskRuntime, RuntimeError, ShutdownOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
