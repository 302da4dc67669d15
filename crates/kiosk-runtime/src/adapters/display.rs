//! # Scripted Touch Display
//!
//! Customer input comes from queues filled ahead of time or while the
//! controller runs: menu operations, PIN entries and answers to views that
//! ask something. Every screen shown is recorded as a [`ScreenEvent`].
//!
//! The insert-cash view honors the display contract: a scripted
//! [`ViewResponse::DepositResolvedNormally`] is only returned after the cash
//! sensor reports an insertion.

use crate::adapters::dispenser::CashSensor;
use async_trait::async_trait;
use kiosk_session::{
    Device, DeviceError, ErrorPrompt, OperationRequest, Pin, Prompt, PromptHandle, TouchDisplay,
    View, ViewPayload, ViewResponse,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Something the display put on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScreenEvent {
    /// Error prompt shown.
    Error(ErrorPrompt),
    /// Prompt opened.
    PromptOpened(Prompt),
    /// Prompt cleared.
    PromptClosed(Prompt),
    /// View shown with its payload.
    View(View, ViewPayload),
}

/// Unbounded queue whose receiving end is awaited by the display.
struct Script<T> {
    tx: mpsc::UnboundedSender<T>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<T>>,
}

impl<T> Script<T> {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    fn push(&self, item: T) {
        // The receiver lives as long as the sender.
        let _ = self.tx.send(item);
    }

    async fn next(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }
}

/// Touch display answering from scripted customer input.
pub struct ScriptedDisplay {
    delay: Duration,
    operations: Script<OperationRequest>,
    pins: Script<Option<Pin>>,
    answers: Script<ViewResponse>,
    cash_sensor: Option<CashSensor>,
    screens: Arc<Mutex<Vec<ScreenEvent>>>,
}

impl ScriptedDisplay {
    /// Display whose screen updates each take `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            operations: Script::new(),
            pins: Script::new(),
            answers: Script::new(),
            cash_sensor: None,
            screens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Relay the acceptor's insertion sensor to the insert-cash view.
    pub fn with_cash_sensor(mut self, sensor: CashSensor) -> Self {
        self.cash_sensor = Some(sensor);
        self
    }

    /// Customer taps a menu operation.
    pub fn push_operation(&self, operation: OperationRequest) {
        self.operations.push(operation);
    }

    /// Customer enters a PIN, or cancels entry with `None`.
    pub fn push_pin(&self, pin: Option<Pin>) {
        self.pins.push(pin);
    }

    /// Customer's answer to the next view that asks something.
    pub fn push_answer(&self, answer: ViewResponse) {
        self.answers.push(answer);
    }

    /// Everything shown so far.
    pub fn screens(&self) -> Vec<ScreenEvent> {
        self.screens.lock().clone()
    }

    /// Error prompts shown so far.
    pub fn errors(&self) -> Vec<ErrorPrompt> {
        self.screens
            .lock()
            .iter()
            .filter_map(|event| match event {
                ScreenEvent::Error(prompt) => Some(*prompt),
                _ => None,
            })
            .collect()
    }

    /// Views shown so far.
    pub fn views(&self) -> Vec<View> {
        self.screens
            .lock()
            .iter()
            .filter_map(|event| match event {
                ScreenEvent::View(view, _) => Some(*view),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: ScreenEvent) {
        info!(screen = ?event, "Display");
        self.screens.lock().push(event);
    }

    async fn answer(&self) -> Result<ViewResponse, DeviceError> {
        self.answers.next().await.ok_or_else(script_closed)
    }

    async fn insert_cash_answer(&self) -> Result<ViewResponse, DeviceError> {
        let answer = self.answer().await?;
        if answer == ViewResponse::DepositResolvedNormally {
            if let Some(sensor) = &self.cash_sensor {
                sensor.clone().inserted().await?;
            }
        }
        Ok(answer)
    }
}

fn script_closed() -> DeviceError {
    DeviceError::unexpected(Device::Display, "input script closed")
}

fn asks_customer(view: View) -> bool {
    matches!(
        view,
        View::InsertCashToDeposit | View::DepositConfirmation | View::TransferConfirmation
    )
}

#[async_trait]
impl TouchDisplay for ScriptedDisplay {
    async fn await_user_operation(&self) -> Result<OperationRequest, DeviceError> {
        let operation = self.operations.next().await.ok_or_else(script_closed)?;
        tokio::time::sleep(self.delay).await;
        info!(?operation, "Customer chose operation");
        Ok(operation)
    }

    async fn request_pin_entry(&self) -> Result<Option<Pin>, DeviceError> {
        let pin = self.pins.next().await.ok_or_else(script_closed)?;
        tokio::time::sleep(self.delay).await;
        Ok(pin)
    }

    async fn show_error_prompt(&self, prompt: ErrorPrompt) -> Result<(), DeviceError> {
        tokio::time::sleep(self.delay).await;
        self.record(ScreenEvent::Error(prompt));
        Ok(())
    }

    async fn show_prompt(&self, prompt: Prompt) -> Result<PromptHandle, DeviceError> {
        tokio::time::sleep(self.delay).await;
        self.record(ScreenEvent::PromptOpened(prompt));

        let screens = self.screens.clone();
        let delay = self.delay;
        Ok(PromptHandle::new(move || {
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                screens.lock().push(ScreenEvent::PromptClosed(prompt));
                Ok(())
            })
        }))
    }

    async fn show_view(
        &self,
        view: View,
        payload: ViewPayload,
    ) -> Result<ViewResponse, DeviceError> {
        tokio::time::sleep(self.delay).await;
        self.record(ScreenEvent::View(view, payload));

        if !asks_customer(view) {
            return Ok(ViewResponse::Acknowledged);
        }
        if view == View::InsertCashToDeposit {
            return self.insert_cash_answer().await;
        }
        self.answer().await
    }
}
