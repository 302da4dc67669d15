//! Session Driver - the state machine loop
//!
//! Holds the shared collaborators and the current state only between
//! iterations. Each iteration runs one state's `process` to completion and
//! takes the successor it returns.

use crate::error::{KioskError, KioskResult};
use crate::metrics;
use crate::ports::inbound::SessionControllerApi;
use crate::states::{
    awaiting_customer, balance_check, deposit, main_menu, maintenance, transfer, withdraw,
    Peripherals, SessionState,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Session controller configuration
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Deadline for each read-only bank call. `None` waits as long as the
    /// bank does. Money movements are never bounded.
    pub bank_deadline: Option<Duration>,
    /// Machine identifier for logs
    pub machine_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bank_deadline: None,
            machine_id: "kiosk-00".to_string(),
        }
    }
}

impl SessionConfig {
    /// Reject settings the controller cannot honor.
    pub fn validate(&self) -> KioskResult<()> {
        if self.bank_deadline == Some(Duration::ZERO) {
            return Err(KioskError::InvalidConfig {
                reason: "bank deadline must be greater than zero".to_string(),
            });
        }
        if self.machine_id.trim().is_empty() {
            return Err(KioskError::InvalidConfig {
                reason: "machine id must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Drives customer sessions one state at a time.
pub struct SessionDriver {
    config: SessionConfig,
    peripherals: Peripherals,
    shutdown: watch::Receiver<bool>,
}

impl SessionDriver {
    /// Build a driver. The bank deadline from `config` is applied to the
    /// peripherals' gateway.
    pub fn new(
        config: SessionConfig,
        mut peripherals: Peripherals,
        shutdown: watch::Receiver<bool>,
    ) -> KioskResult<Self> {
        config.validate()?;
        peripherals.bank = peripherals.bank.with_deadline(config.bank_deadline);
        Ok(Self {
            config,
            peripherals,
            shutdown,
        })
    }

    /// Driver configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }
}

#[async_trait]
impl SessionControllerApi for SessionDriver {
    async fn process(&self, state: SessionState) -> Option<SessionState> {
        let p = &self.peripherals;
        let next = match state {
            SessionState::AwaitingCustomer => awaiting_customer::process(p).await.into(),
            SessionState::MainMenu(session) => main_menu::process(p, session).await.into(),
            SessionState::BalanceCheck(session) => balance_check::process(p, session).await.into(),
            SessionState::Deposit(session) => deposit::process(p, session).await.into(),
            SessionState::Withdraw { session, amount } => {
                withdraw::process(p, session, amount).await.into()
            }
            SessionState::Transfer {
                session,
                amount,
                target_account,
            } => transfer::process(p, session, amount, target_account)
                .await
                .into(),
            SessionState::MaintenanceRequired => {
                let mut shutdown = self.shutdown.clone();
                maintenance::process(p, &mut shutdown).await;
                return None;
            }
        };
        Some(next)
    }

    async fn run(&self) {
        info!(machine = %self.config.machine_id, "Session controller started");
        let mut state = SessionState::AwaitingCustomer;
        loop {
            if self.shutdown_requested() {
                info!(state = state.name(), "Shutdown requested, stopping");
                break;
            }
            debug!(
                state = state.name(),
                session = ?state.session().map(|s| s.session_id()),
                "Entering state"
            );
            metrics::record_transition(state.name());
            match self.process(state).await {
                Some(next) => state = next,
                None => break,
            }
        }
        info!(machine = %self.config.machine_id, "Session controller stopped");
    }
}
