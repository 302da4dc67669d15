//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, outbound devices and bank).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
