//! # Kiosk Runtime
//!
//! Entry point for one kiosk.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize logging and metrics
//! 3. Build the simulated devices and in-memory bank
//! 4. Spawn the session controller
//! 5. Optionally play a scripted demo customer
//! 6. Run until Ctrl+C, then shut down and dump the counters

use anyhow::{Context, Result};
use kiosk_runtime::{demo, KioskConfig, KioskRuntime};
use kiosk_telemetry::init_telemetry;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = KioskConfig::from_env().context("Failed to load kiosk configuration")?;
    let telemetry =
        init_telemetry(config.telemetry.clone()).context("Failed to initialize telemetry")?;

    let demo_customer = config.demo_customer;
    let mut runtime = KioskRuntime::new(config)?;
    let container = runtime.container();
    demo::seed_bank(&container.bank);

    runtime.start()?;
    kiosk_telemetry::log_event!(
        info,
        "runtime",
        "Session controller started",
        machine_id = %runtime.container().config.machine_id
    );

    if demo_customer {
        let container = runtime.container();
        tokio::spawn(async move { demo::play_customer(&container).await });
    }

    info!("Kiosk is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;

    match telemetry.metrics().encode() {
        Ok(text) => info!("Session counters at shutdown:\n{}", text),
        Err(err) => warn!(error = %err, "Failed to encode metrics"),
    }

    Ok(())
}
