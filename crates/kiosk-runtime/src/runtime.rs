//! # Kiosk Runtime
//!
//! Owns the device container and the session controller task.
//!
//! ## Shutdown
//!
//! The controller checks the shutdown signal between state transitions, and
//! a parked maintenance state wakes on it directly. A state waiting on the
//! customer does not; if the controller has not stopped within the grace
//! period its task is aborted.

use std::sync::Arc;

use kiosk_session::{KioskError, SessionControllerApi, SessionDriver};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::container::{ConfigError, KioskConfig, KioskContainer};

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session controller could not be built.
    #[error(transparent)]
    Session(#[from] KioskError),

    /// `start` called twice.
    #[error("Session controller already started")]
    AlreadyStarted,
}

/// How the controller task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Controller stopped on its own within the grace period.
    Clean,
    /// Controller was aborted after the grace period.
    Aborted,
    /// Controller task panicked.
    Failed,
    /// Controller was never started.
    NotStarted,
}

/// The kiosk runtime.
pub struct KioskRuntime {
    container: Arc<KioskContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    controller: Option<JoinHandle<()>>,
}

impl KioskRuntime {
    /// Create a runtime from validated configuration.
    pub fn new(config: KioskConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        Ok(Self::with_container(KioskContainer::new(config)))
    }

    /// Create a runtime around an existing container.
    pub fn with_container(container: KioskContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            controller: None,
        }
    }

    /// The device container.
    pub fn container(&self) -> Arc<KioskContainer> {
        Arc::clone(&self.container)
    }

    /// Spawn the session controller.
    pub fn start(&mut self) -> Result<(), RuntimeError> {
        if self.controller.is_some() {
            return Err(RuntimeError::AlreadyStarted);
        }
        let config = &self.container.config;
        let driver = SessionDriver::new(
            config.session_config(),
            self.container.peripherals(),
            self.shutdown_rx.clone(),
        )?;

        info!("===========================================");
        info!("  Kiosk Runtime v{}", crate::VERSION);
        info!("  Machine: {}", config.machine_id);
        info!(
            "  Bank deadline: {}",
            config
                .bank_deadline
                .map(|d| format!("{}ms", d.as_millis()))
                .unwrap_or_else(|| "none".to_string())
        );
        info!("===========================================");

        self.controller = Some(tokio::spawn(async move { driver.run().await }));
        Ok(())
    }

    /// Whether the controller task has ended.
    pub fn is_finished(&self) -> bool {
        self.controller
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Signal shutdown and wait up to the grace period for the controller.
    pub async fn shutdown(&mut self) -> ShutdownOutcome {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let Some(mut handle) = self.controller.take() else {
            return ShutdownOutcome::NotStarted;
        };

        let grace = self.container.config.shutdown_grace;
        let outcome = match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => ShutdownOutcome::Clean,
            Ok(Err(err)) => {
                error!(error = %err, "Session controller task failed");
                ShutdownOutcome::Failed
            }
            Err(_) => {
                warn!(
                    grace_ms = grace.as_millis() as u64,
                    "Session controller still busy, aborting"
                );
                handle.abort();
                ShutdownOutcome::Aborted
            }
        };

        info!(?outcome, "Shutdown complete");
        outcome
    }
}
