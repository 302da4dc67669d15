//! # MaintenanceRequired
//!
//! Announces that the machine is out of service, then parks. No bank or
//! device call is made while parked.
//!
//! Recovery into [`SessionState::AwaitingCustomer`](super::SessionState) is
//! left to out-of-band intervention; the only exit here is the driver's
//! shutdown signal, which ends the session loop.

use super::{announce, Peripherals};
use crate::domain::ErrorPrompt;
use tokio::sync::watch;
use tracing::{error, info};

/// Show the maintenance prompt and park until shutdown is requested.
pub async fn process(p: &Peripherals, shutdown: &mut watch::Receiver<bool>) {
    announce(p.display.as_ref(), ErrorPrompt::MaintenanceRequired).await;
    error!("Kiosk parked in maintenance mode");

    if *shutdown.borrow_and_update() {
        info!("Shutdown requested while in maintenance");
        return;
    }
    loop {
        if shutdown.changed().await.is_err() {
            // Sender gone: nobody can request shutdown any more. Stay parked.
            std::future::pending::<()>().await;
        }
        if *shutdown.borrow_and_update() {
            info!("Shutdown requested while in maintenance");
            return;
        }
    }
}
