//! # Deposit Flows
//!
//! The insert-cash view and the acceptor's sensor race each other; whichever
//! settles first decides between counting and cancelling. Cash that reached
//! the slot is either credited or handed back, never lost.

use super::harness::{Kiosk, OPENING_BALANCE};
use kiosk_runtime::adapters::{AcceptorSlot, AuditKind, ScreenEvent};
use kiosk_session::{ErrorPrompt, Money, OperationRequest, Prompt, View, ViewPayload, ViewResponse};

const CASH: u64 = 20_000;

#[tokio::test(start_paused = true)]
async fn test_deposit_is_counted_confirmed_and_credited() {
    let kiosk = Kiosk::start();
    let cassette = kiosk.devices.dispenser.cassette();
    kiosk.choose(OperationRequest::Deposit);
    kiosk.answer(ViewResponse::DepositResolvedNormally);
    kiosk.answer(ViewResponse::DepositConfirmation { confirmed: true });
    kiosk.choose(OperationRequest::Exit);
    kiosk.devices.dispenser.insert_cash(Money::from(CASH));
    kiosk.log_in();

    kiosk.card_returned(1).await;

    assert_eq!(kiosk.balance(), Money::from(OPENING_BALANCE + CASH));
    assert_eq!(
        kiosk.devices.dispenser.cassette(),
        cassette.checked_add(Money::from(CASH)).unwrap()
    );
    assert_eq!(kiosk.devices.dispenser.slot(), AcceptorSlot::default());

    let screens = kiosk.devices.display.screens();
    assert!(screens.contains(&ScreenEvent::View(
        View::DepositConfirmation,
        ViewPayload::DepositConfirmation {
            target_account: Kiosk::account(),
            amount: Money::from(CASH),
        },
    )));
    assert!(screens.contains(&ScreenEvent::View(
        View::DepositSummary,
        ViewPayload::DepositSummary {
            account: Kiosk::account(),
            previous_balance: Money::from(OPENING_BALANCE),
            new_balance: Money::from(OPENING_BALANCE + CASH),
            amount: Money::from(CASH),
        },
    )));
    assert_eq!(kiosk.devices.bank.audit_log()[0].kind, AuditKind::Deposit);
    kiosk.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_cash_inserted_while_session_waits() {
    let kiosk = Kiosk::start();
    kiosk.choose(OperationRequest::Deposit);
    kiosk.answer(ViewResponse::DepositResolvedNormally);
    kiosk.answer(ViewResponse::DepositConfirmation { confirmed: true });
    kiosk.choose(OperationRequest::Exit);
    kiosk.log_in();

    kiosk
        .wait_until("acceptor open", |d| d.dispenser.slot().open)
        .await;
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    assert!(kiosk.devices.display.views().contains(&View::InsertCashToDeposit));
    assert!(!kiosk.devices.display.views().contains(&View::DepositConfirmation));

    kiosk.devices.dispenser.insert_cash(Money::from(CASH));
    kiosk.card_returned(1).await;

    assert_eq!(kiosk.balance(), Money::from(OPENING_BALANCE + CASH));
    kiosk.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_on_display_before_cash() {
    let kiosk = Kiosk::start();
    kiosk.choose(OperationRequest::Deposit);
    kiosk.answer(ViewResponse::DepositCancelledFromDisplay);
    kiosk.choose(OperationRequest::Exit);
    kiosk.log_in();

    kiosk.card_returned(1).await;

    assert_eq!(kiosk.balance(), Money::from(OPENING_BALANCE));
    assert!(kiosk.devices.bank.audit_log().is_empty());
    assert!(kiosk.devices.display.views().contains(&View::ActionCancelled));
    assert!(!kiosk
        .devices
        .display
        .screens()
        .contains(&ScreenEvent::PromptOpened(Prompt::RetrieveDispensedFunds)));

    let slot = kiosk.devices.dispenser.slot();
    assert!(!slot.open);
    assert_eq!(slot.inserted, None);
    kiosk.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_on_display_after_cash_returns_it() {
    let kiosk = Kiosk::start();
    let cassette = kiosk.devices.dispenser.cassette();
    kiosk.choose(OperationRequest::Deposit);
    kiosk.answer(ViewResponse::DepositCancelledFromDisplay);
    kiosk.choose(OperationRequest::Exit);
    kiosk.devices.dispenser.insert_cash(Money::from(CASH));
    kiosk.log_in();

    kiosk.card_returned(1).await;

    assert_eq!(kiosk.balance(), Money::from(OPENING_BALANCE));
    assert_eq!(kiosk.devices.dispenser.cassette(), cassette);
    assert_eq!(kiosk.devices.dispenser.tray(), None);
    assert!(kiosk
        .devices
        .display
        .screens()
        .contains(&ScreenEvent::PromptClosed(Prompt::RetrieveDispensedFunds)));
    assert!(kiosk.devices.bank.audit_log().is_empty());
    kiosk.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_declined_count_returns_cash() {
    let kiosk = Kiosk::start();
    kiosk.choose(OperationRequest::Deposit);
    kiosk.answer(ViewResponse::DepositResolvedNormally);
    kiosk.answer(ViewResponse::DepositConfirmation { confirmed: false });
    kiosk.choose(OperationRequest::Exit);
    kiosk.devices.dispenser.insert_cash(Money::from(CASH));
    kiosk.log_in();

    kiosk.card_returned(1).await;

    assert_eq!(kiosk.balance(), Money::from(OPENING_BALANCE));
    assert!(kiosk.devices.display.views().contains(&View::ActionCancelled));
    assert!(!kiosk.devices.display.views().contains(&View::DepositSummary));
    kiosk.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_bank_offline_at_commit_refunds_cash() {
    let kiosk = Kiosk::start();
    kiosk.choose(OperationRequest::Deposit);
    kiosk.answer(ViewResponse::DepositResolvedNormally);
    kiosk.choose(OperationRequest::Exit);
    kiosk.devices.dispenser.insert_cash(Money::from(CASH));
    kiosk.log_in();

    // Take the bank down once the customer is looking at the count.
    kiosk
        .wait_until("deposit confirmation", |d| {
            d.display.views().contains(&View::DepositConfirmation)
        })
        .await;
    kiosk.devices.bank.set_online(false);
    kiosk.answer(ViewResponse::DepositConfirmation { confirmed: true });

    kiosk.card_returned(1).await;

    assert_eq!(kiosk.errors(), vec![ErrorPrompt::NetworkFailure]);
    assert!(kiosk.devices.display.views().contains(&View::ActionCancelled));
    assert!(kiosk
        .devices
        .display
        .screens()
        .contains(&ScreenEvent::PromptClosed(Prompt::RetrieveDispensedFunds)));
    kiosk.devices.bank.set_online(true);
    assert_eq!(kiosk.balance(), Money::from(OPENING_BALANCE));
    kiosk.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_conflict_at_commit_refunds_cash() {
    let kiosk = Kiosk::start();
    kiosk.devices.bank.inject_conflict(&Kiosk::account());
    kiosk.choose(OperationRequest::Deposit);
    kiosk.answer(ViewResponse::DepositResolvedNormally);
    kiosk.answer(ViewResponse::DepositConfirmation { confirmed: true });
    kiosk.choose(OperationRequest::Exit);
    kiosk.devices.dispenser.insert_cash(Money::from(CASH));
    kiosk.log_in();

    kiosk.card_returned(1).await;

    assert_eq!(kiosk.errors(), vec![ErrorPrompt::UnknownError]);
    assert_eq!(kiosk.balance(), Money::from(OPENING_BALANCE));
    assert_eq!(kiosk.devices.dispenser.tray(), None);
    kiosk.stop().await;
}
