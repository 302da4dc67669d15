//! # Device Container
//!
//! Holds the simulated devices and bank for one kiosk and hands them to the
//! session controller as [`Peripherals`].
//!
//! The concrete handles stay reachable so the customer side (card slot,
//! cash slot, touch screen) and the operator side (fault switches, audit log)
//! can be driven while the controller runs.

use std::sync::Arc;

use kiosk_session::{Money, Peripherals, SystemClock, TimeSource};
use tracing::info;

use crate::adapters::{InMemoryBank, ScriptedDisplay, SimulatedCardReader, SimulatedDispenser};
use crate::container::config::KioskConfig;

/// Notes loaded into the cassette at startup, in minor units.
pub const DEFAULT_CASSETTE: u64 = 5_000_000;

/// Devices and bank for one kiosk.
pub struct KioskContainer {
    /// Card reader.
    pub card_reader: Arc<SimulatedCardReader>,
    /// Cash dispenser and acceptor.
    pub dispenser: Arc<SimulatedDispenser>,
    /// Touch display.
    pub display: Arc<ScriptedDisplay>,
    /// Bank backend.
    pub bank: Arc<InMemoryBank>,
    /// Clock used for card expiry.
    pub clock: Arc<dyn TimeSource>,
    /// Kiosk configuration (immutable after initialization).
    pub config: KioskConfig,
}

impl KioskContainer {
    /// Build every device with the configured latency.
    pub fn new(config: KioskConfig) -> Self {
        let delay = config.device_delay;

        let card_reader = Arc::new(SimulatedCardReader::new(delay));
        let dispenser = Arc::new(SimulatedDispenser::new(
            Money::from(DEFAULT_CASSETTE),
            delay,
        ));
        let display =
            Arc::new(ScriptedDisplay::new(delay).with_cash_sensor(dispenser.cash_sensor()));
        let bank = Arc::new(InMemoryBank::new(delay));

        info!(
            machine_id = %config.machine_id,
            device_delay_ms = delay.as_millis() as u64,
            cassette = DEFAULT_CASSETTE,
            "Simulated devices initialized"
        );

        Self {
            card_reader,
            dispenser,
            display,
            bank,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the clock used for card expiry.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Collaborators for the session controller.
    pub fn peripherals(&self) -> Peripherals {
        Peripherals::new(
            self.card_reader.clone(),
            self.dispenser.clone(),
            self.display.clone(),
            self.bank.clone(),
            self.clock.clone(),
        )
    }
}
