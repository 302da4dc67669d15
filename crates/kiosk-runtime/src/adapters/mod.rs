//! # Adapters
//!
//! Simulated implementations of the session controller's outbound ports.
//!
//! Each device models its real counterpart's latency with a fixed delay and
//! exposes customer-side controls (insert a card, put cash in the slot, tap
//! the screen) plus fault switches for exercising the controller's fault
//! policy.

pub mod bank;
pub mod card_reader;
pub mod dispenser;
pub mod display;

pub use bank::{AccountRecord, AuditEntry, AuditKind, InMemoryBank};
pub use card_reader::SimulatedCardReader;
pub use dispenser::{AcceptorSlot, CashSensor, SimulatedDispenser};
pub use display::{ScreenEvent, ScriptedDisplay};
