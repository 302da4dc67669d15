//! # Simulated Cash Dispenser
//!
//! A note cassette for payouts and an acceptor slot for deposits.
//!
//! ```text
//! allow_deposit ──→ open ──insert_cash──→ inserted ──accept_deposit──→ cassette
//!                    │                       │
//!                    └──cancel_deposit──→ closed (cash handed back if any)
//! ```
//!
//! The acceptor state is published on a watch channel so the insertion sensor
//! and the display simulator observe the same slot.

use async_trait::async_trait;
use kiosk_session::{CashDispenser, Device, DeviceError, Money};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Acceptor slot state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcceptorSlot {
    /// Slot open for cash.
    pub open: bool,
    /// Cash sitting in the slot, not yet counted into the cassette.
    pub inserted: Option<Money>,
    /// Deposit cancelled before anything was inserted.
    pub cancelled: bool,
}

/// Read-only view of the acceptor's insertion sensor.
#[derive(Clone, Debug)]
pub struct CashSensor {
    rx: watch::Receiver<AcceptorSlot>,
}

impl CashSensor {
    /// Resolve once cash is detected in the slot.
    pub async fn inserted(&mut self) -> Result<(), DeviceError> {
        self.rx
            .wait_for(|slot| slot.inserted.is_some())
            .await
            .map(|_| ())
            .map_err(|_| DeviceError::unexpected(Device::Dispenser, "cash sensor disconnected"))
    }
}

/// Dispenser and acceptor backed by an in-memory cassette.
pub struct SimulatedDispenser {
    delay: Duration,
    cassette: Mutex<Money>,
    slot: watch::Sender<AcceptorSlot>,
    staged: Mutex<Option<Money>>,
    tray: Mutex<Option<Money>>,
    dispense_jammed: AtomicBool,
}

impl SimulatedDispenser {
    /// Dispenser holding `cassette` minor units, with each mechanical
    /// operation taking `delay`.
    pub fn new(cassette: Money, delay: Duration) -> Self {
        let (slot, _) = watch::channel(AcceptorSlot::default());
        Self {
            delay,
            cassette: Mutex::new(cassette),
            slot,
            staged: Mutex::new(None),
            tray: Mutex::new(None),
            dispense_jammed: AtomicBool::new(false),
        }
    }

    /// Sensor shared with the display simulator.
    pub fn cash_sensor(&self) -> CashSensor {
        CashSensor {
            rx: self.slot.subscribe(),
        }
    }

    /// Put cash in the acceptor. If the slot is closed the bundle is held
    /// until the next deposit opens it.
    pub fn insert_cash(&self, amount: Money) {
        let mut accepted = false;
        self.slot.send_modify(|slot| {
            if slot.open && slot.inserted.is_none() {
                slot.inserted = Some(amount);
                accepted = true;
            }
        });
        if !accepted {
            *self.staged.lock() = Some(amount);
        }
    }

    /// Make every subsequent payout fail mechanically.
    pub fn set_dispense_jammed(&self, jammed: bool) {
        self.dispense_jammed.store(jammed, Ordering::SeqCst);
    }

    /// Notes left in the cassette.
    pub fn cassette(&self) -> Money {
        *self.cassette.lock()
    }

    /// Cash waiting in the output tray.
    pub fn tray(&self) -> Option<Money> {
        *self.tray.lock()
    }

    /// Current acceptor state.
    pub fn slot(&self) -> AcceptorSlot {
        *self.slot.borrow()
    }
}

#[async_trait]
impl CashDispenser for SimulatedDispenser {
    async fn funds_available(&self, amount: Money) -> Result<bool, DeviceError> {
        tokio::time::sleep(self.delay).await;
        Ok(*self.cassette.lock() >= amount)
    }

    async fn allow_deposit(&self) -> Result<(), DeviceError> {
        tokio::time::sleep(self.delay).await;
        let staged = self.staged.lock().take();
        self.slot.send_replace(AcceptorSlot {
            open: true,
            inserted: staged,
            cancelled: false,
        });
        debug!("Acceptor open");
        Ok(())
    }

    async fn await_cash_insertion(&self) -> Result<bool, DeviceError> {
        let mut rx = self.slot.subscribe();
        let inserted = rx
            .wait_for(|slot| slot.inserted.is_some() || slot.cancelled)
            .await
            .map(|slot| slot.inserted.is_some())
            .map_err(|_| DeviceError::unexpected(Device::Dispenser, "cash sensor disconnected"))?;
        debug!(inserted, "Cash sensor settled");
        Ok(inserted)
    }

    async fn cancel_deposit(&self) -> Result<bool, DeviceError> {
        tokio::time::sleep(self.delay).await;
        let mut returned = None;
        self.slot.send_modify(|slot| {
            returned = slot.inserted.take();
            slot.open = false;
            slot.cancelled = true;
        });
        if let Some(amount) = returned {
            *self.tray.lock() = Some(amount);
            info!(%amount, "Deposit cancelled, cash returned to tray");
        }
        Ok(returned.is_some())
    }

    async fn accept_deposit(&self) -> Result<(), DeviceError> {
        tokio::time::sleep(self.delay).await;
        let mut taken = None;
        self.slot.send_modify(|slot| {
            taken = slot.inserted.take();
            slot.open = false;
        });
        let Some(amount) = taken else {
            return Err(DeviceError::unexpected(
                Device::Dispenser,
                "no cash in acceptor",
            ));
        };
        let mut cassette = self.cassette.lock();
        *cassette = cassette
            .checked_add(amount)
            .map_err(|err| DeviceError::hardware(Device::Dispenser, err.to_string()))?;
        Ok(())
    }

    async fn count_deposit(&self) -> Result<Money, DeviceError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.slot.borrow().inserted.unwrap_or(Money::ZERO))
    }

    async fn await_dispenser_emptied(&self) -> Result<(), DeviceError> {
        tokio::time::sleep(self.delay).await;
        if let Some(amount) = self.tray.lock().take() {
            debug!(%amount, "Tray emptied");
        }
        Ok(())
    }

    async fn dispense(&self, amount: Money) -> Result<(), DeviceError> {
        tokio::time::sleep(self.delay).await;
        if self.dispense_jammed.load(Ordering::SeqCst) {
            warn!(%amount, "Note transport jammed");
            return Err(DeviceError::hardware(
                Device::Dispenser,
                "note transport jammed",
            ));
        }
        {
            let mut cassette = self.cassette.lock();
            *cassette = cassette
                .checked_sub(amount)
                .map_err(|_| DeviceError::hardware(Device::Dispenser, "cassette empty"))?;
        }
        *self.tray.lock() = Some(amount);
        Ok(())
    }
}
