//! # Demo Customer
//!
//! Seeds the in-memory bank and walks one scripted customer through the
//! kiosk: balance check, deposit, withdrawal, transfer, exit.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use kiosk_session::{AccountNumber, CardData, Money, OperationRequest, Pan, Pin, ViewResponse};
use tracing::info;

use crate::adapters::InMemoryBank;
use crate::container::KioskContainer;

/// Card used by the demo customer.
pub const DEMO_PAN: &str = "4000001234567899";
/// PIN of [`DEMO_PAN`].
pub const DEMO_PIN: &str = "4321";
/// Account behind [`DEMO_PAN`].
pub const DEMO_ACCOUNT: &str = "ACC-1001";
/// Transfer target seeded next to the demo account.
pub const DEMO_TARGET_ACCOUNT: &str = "ACC-2002";

/// Open the demo accounts and issue the demo card.
pub fn seed_bank(bank: &InMemoryBank) {
    bank.open_account(
        AccountNumber::new(DEMO_ACCOUNT),
        "Everyday Checking",
        Money::from(250_000u64),
        Money::from(100_000u64),
    );
    bank.open_account(
        AccountNumber::new(DEMO_TARGET_ACCOUNT),
        "Household Savings",
        Money::from(10_000u64),
        Money::from(100_000u64),
    );
    bank.issue_card(&Pan::new(DEMO_PAN), DEMO_PIN, AccountNumber::new(DEMO_ACCOUNT));
    info!(accounts = 2, "Demo bank seeded");
}

/// Card for the demo customer, valid for another year.
pub fn demo_card() -> CardData {
    CardData::new(Pan::new(DEMO_PAN), Utc::now() + ChronoDuration::days(365))
}

/// Queue one full customer session and wait for it to end.
///
/// Customer input is queued up front; the deposit cash goes in once the
/// acceptor has opened.
pub async fn play_customer(container: &KioskContainer) {
    let display = &container.display;

    display.push_pin(Some(Pin::new(DEMO_PIN)));
    display.push_operation(OperationRequest::BalanceCheck);

    display.push_operation(OperationRequest::Deposit);
    display.push_answer(ViewResponse::DepositResolvedNormally);
    display.push_answer(ViewResponse::DepositConfirmation { confirmed: true });
    container.dispenser.insert_cash(Money::from(20_000u64));

    display.push_operation(OperationRequest::Withdrawal { amount: 6_000 });

    display.push_operation(OperationRequest::Transfer {
        amount: 15_000,
        target_account: AccountNumber::new(DEMO_TARGET_ACCOUNT),
    });
    display.push_answer(ViewResponse::TransferConfirmation { confirmed: true });

    display.push_operation(OperationRequest::Exit);

    info!("Demo customer inserting card");
    container.card_reader.insert_card(Some(demo_card()));

    while container.card_reader.removed() == 0 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    info!(
        balance = ?container.bank.balance_of(&AccountNumber::new(DEMO_ACCOUNT)),
        movements = container.bank.audit_log().len(),
        "Demo customer left"
    );
}
