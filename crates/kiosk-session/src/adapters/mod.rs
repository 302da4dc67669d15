//! # Adapters Module
//!
//! Controller-side wrappers around outbound ports.

pub mod bank_gateway;

pub use bank_gateway::BankGateway;
