//! # Simulated Card Reader
//!
//! Cards are fed in through [`SimulatedCardReader::insert_card`]; the
//! controller's read idles until one arrives.

use async_trait::async_trait;
use kiosk_session::{CardData, CardReader, Device, DeviceError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Card reader driven by a queue of inserted cards.
pub struct SimulatedCardReader {
    delay: Duration,
    slot_tx: mpsc::UnboundedSender<Option<CardData>>,
    slot_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Option<CardData>>>,
    current: Mutex<Option<CardData>>,
    jammed: AtomicBool,
    released: AtomicUsize,
    removed: AtomicUsize,
}

impl SimulatedCardReader {
    /// Reader whose mechanical operations each take `delay`.
    pub fn new(delay: Duration) -> Self {
        let (slot_tx, slot_rx) = mpsc::unbounded_channel();
        Self {
            delay,
            slot_tx,
            slot_rx: tokio::sync::Mutex::new(slot_rx),
            current: Mutex::new(None),
            jammed: AtomicBool::new(false),
            released: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
        }
    }

    /// Insert a card. `None` is a card whose chip and stripe cannot be read.
    pub fn insert_card(&self, card: Option<CardData>) {
        // The receiver lives as long as `self`.
        let _ = self.slot_tx.send(card);
    }

    /// Make every subsequent release fail mechanically.
    pub fn set_jammed(&self, jammed: bool) {
        self.jammed.store(jammed, Ordering::SeqCst);
    }

    /// Card currently in the slot.
    pub fn current_card(&self) -> Option<CardData> {
        self.current.lock().clone()
    }

    /// Number of completed releases.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Number of completed removals.
    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CardReader for SimulatedCardReader {
    async fn read_card(&self) -> Result<Option<CardData>, DeviceError> {
        let inserted = self.slot_rx.lock().await.recv().await;
        let Some(card) = inserted else {
            return Err(DeviceError::unexpected(
                Device::CardReader,
                "card slot closed",
            ));
        };
        tokio::time::sleep(self.delay).await;
        debug!(readable = card.is_some(), "Card read");
        *self.current.lock() = card.clone();
        Ok(card)
    }

    async fn release_card(&self) -> Result<(), DeviceError> {
        tokio::time::sleep(self.delay).await;
        if self.jammed.load(Ordering::SeqCst) {
            return Err(DeviceError::hardware(
                Device::CardReader,
                "card jammed in transport",
            ));
        }
        self.released.fetch_add(1, Ordering::SeqCst);
        debug!("Card released");
        Ok(())
    }

    async fn await_card_removal(&self) -> Result<(), DeviceError> {
        tokio::time::sleep(self.delay).await;
        *self.current.lock() = None;
        self.removed.fetch_add(1, Ordering::SeqCst);
        debug!("Card removed");
        Ok(())
    }
}
