//! Kiosk under test.
//!
//! Runs the real controller against the runtime's simulators with a seeded
//! bank. Tests run on paused time, so device latency costs nothing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use kiosk_runtime::demo::{self, DEMO_ACCOUNT, DEMO_PIN, DEMO_TARGET_ACCOUNT};
use kiosk_runtime::{KioskConfig, KioskContainer, KioskRuntime, ShutdownOutcome};
use kiosk_session::{
    AccountNumber, CardData, ErrorPrompt, Money, OperationRequest, Pan, Pin, ViewResponse,
};

/// Latency of every simulated device and bank call.
pub const DELAY: Duration = Duration::from_millis(5);

/// Seeded balance of the demo account.
pub const OPENING_BALANCE: u64 = 250_000;

/// Seeded withdrawal limit of the demo account.
pub const LIMIT: u64 = 100_000;

pub fn config() -> KioskConfig {
    KioskConfig {
        device_delay: DELAY,
        shutdown_grace: Duration::from_millis(100),
        demo_customer: false,
        ..Default::default()
    }
}

pub struct Kiosk {
    runtime: KioskRuntime,
    pub devices: Arc<KioskContainer>,
}

impl Kiosk {
    pub fn start() -> Self {
        Self::start_with(config())
    }

    pub fn start_with(config: KioskConfig) -> Self {
        let mut runtime = KioskRuntime::new(config).expect("valid config");
        let devices = runtime.container();
        demo::seed_bank(&devices.bank);
        runtime.start().expect("controller starts");
        Self { runtime, devices }
    }

    pub fn account() -> AccountNumber {
        AccountNumber::new(DEMO_ACCOUNT)
    }

    pub fn target() -> AccountNumber {
        AccountNumber::new(DEMO_TARGET_ACCOUNT)
    }

    /// Enter the right PIN, then insert the demo card.
    pub fn log_in(&self) {
        self.devices.display.push_pin(Some(Pin::new(DEMO_PIN)));
        self.devices.card_reader.insert_card(Some(demo::demo_card()));
    }

    /// Insert `card` with `pin` queued for entry.
    pub fn present(&self, card: Option<CardData>, pin: Option<&str>) {
        self.devices.display.push_pin(pin.map(Pin::new));
        self.devices.card_reader.insert_card(card);
    }

    pub fn expired_card() -> CardData {
        CardData::new(
            Pan::new(demo::DEMO_PAN),
            Utc::now() - chrono::Duration::days(1),
        )
    }

    pub fn choose(&self, operation: OperationRequest) {
        self.devices.display.push_operation(operation);
    }

    pub fn answer(&self, answer: ViewResponse) {
        self.devices.display.push_answer(answer);
    }

    pub fn balance(&self) -> Money {
        self.devices
            .bank
            .balance_of(&Self::account())
            .expect("seeded account")
    }

    pub fn errors(&self) -> Vec<ErrorPrompt> {
        self.devices.display.errors()
    }

    /// Wait until `done` holds, failing the test after a minute of
    /// simulated time.
    pub async fn wait_until<F>(&self, what: &str, done: F)
    where
        F: Fn(&KioskContainer) -> bool,
    {
        for _ in 0..60_000 {
            if done(&self.devices) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("timed out waiting for {what}; screens: {:?}", self.devices.display.screens());
    }

    /// Wait until the card has been handed back `sessions` times in total.
    pub async fn card_returned(&self, sessions: usize) {
        self.wait_until("card removal", |d| d.card_reader.removed() >= sessions)
            .await;
    }

    pub async fn maintenance(&self) {
        self.wait_until("maintenance mode", |d| {
            d.display.errors().contains(&ErrorPrompt::MaintenanceRequired)
        })
        .await;
    }

    pub async fn stop(mut self) -> ShutdownOutcome {
        self.runtime.shutdown().await
    }
}
