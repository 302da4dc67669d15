//! # Kiosk Container
//!
//! Configuration and the device container the runtime is wired from.

pub mod config;
pub mod devices;

pub use config::{ConfigError, KioskConfig};
pub use devices::{KioskContainer, DEFAULT_CASSETTE};
