//! # Kiosk Session Benchmarks
//!
//! Controller overhead with device latency removed:
//!
//! | Group | Measures |
//! |-------|----------|
//! | session | Card in to card out for a balance-check customer |
//! | bank | Simulated bank round trips, with and without a deadline |
//!
//! ```bash
//! cargo bench --package kiosk-tests --bench session_benchmarks
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kiosk_runtime::adapters::InMemoryBank;
use kiosk_runtime::demo::{self, DEMO_ACCOUNT, DEMO_PAN, DEMO_PIN};
use kiosk_runtime::{KioskConfig, KioskContainer, KioskRuntime};
use kiosk_session::{AccountNumber, BankGateway, OperationRequest, Pan, Pin};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

fn instant_config() -> KioskConfig {
    KioskConfig {
        device_delay: Duration::ZERO,
        demo_customer: false,
        ..Default::default()
    }
}

async fn balance_check_session(devices: &KioskContainer) {
    let served = devices.card_reader.removed();
    devices.display.push_pin(Some(Pin::new(DEMO_PIN)));
    devices.display.push_operation(OperationRequest::BalanceCheck);
    devices.display.push_operation(OperationRequest::Exit);
    devices.card_reader.insert_card(Some(demo::demo_card()));
    while devices.card_reader.removed() == served {
        tokio::task::yield_now().await;
    }
}

fn bench_full_session(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("session");
    group.measurement_time(Duration::from_secs(10));

    let mut runtime = KioskRuntime::new(instant_config()).expect("valid config");
    let devices = runtime.container();
    demo::seed_bank(&devices.bank);
    {
        let _guard = rt.enter();
        runtime.start().expect("controller starts");
    }

    group.bench_function("balance_check_round_trip", |b| {
        b.iter(|| rt.block_on(balance_check_session(&devices)))
    });

    group.finish();
    rt.block_on(runtime.shutdown());
}

fn bench_bank_calls(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("bank");

    let bank = Arc::new(InMemoryBank::new(Duration::ZERO));
    demo::seed_bank(&bank);
    let pan = Pan::new(DEMO_PAN);
    let pin = Pin::new(DEMO_PIN);
    let account = AccountNumber::new(DEMO_ACCOUNT);

    for (name, deadline) in [
        ("no_deadline", None),
        ("with_deadline", Some(Duration::from_secs(1))),
    ] {
        let gateway = BankGateway::new(bank.clone()).with_deadline(deadline);
        let profile = rt
            .block_on(gateway.retrieve_account_data(&pan, &pin))
            .expect("bank online")
            .expect("demo card issued");

        group.bench_function(format!("authenticate/{name}"), |b| {
            b.iter(|| rt.block_on(gateway.retrieve_account_data(black_box(&pan), &pin)))
        });
        group.bench_function(format!("balance/{name}"), |b| {
            b.iter(|| {
                rt.block_on(
                    gateway.retrieve_account_balance(black_box(&account), &profile.session_token),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    name = session_benches;
    config = Criterion::default().sample_size(50);
    targets = bench_full_session, bench_bank_calls
);

criterion_main!(session_benches);
