//! # Deposit
//!
//! The customer races the cash sensor: the insert-cash view and the
//! acceptor's insertion sensor run as two independent tasks and the first to
//! settle decides the branch.
//!
//! ```text
//! allow_deposit
//!   ├─ spawn display: show_view(InsertCashToDeposit)
//!   └─ spawn sensor:  await_cash_insertion
//! first settled
//!   ├─ Sensor  -> await display -> cancelled? cancel : count
//!   └─ Display -> cancel (sensor left to settle on its own)
//! count -> confirm -> commit (balance, process_deposit) -> accept_deposit -> summary
//! ```
//!
//! A display that settles first is always a cancellation. That rests on the
//! [`TouchDisplay`](crate::ports::TouchDisplay) contract: the insert-cash view
//! cannot resolve normally before the sensor signal is relayed to it.
//!
//! Once `process_deposit` succeeds the credit stands. A mechanical fault after
//! that point sends the machine to maintenance; the bank is not touched again.

use super::{announce, Peripherals, SessionState};
use crate::domain::{
    AccountSession, BankError, DeviceError, ErrorPrompt, Money, Prompt, View, ViewPayload,
    ViewResponse,
};
use crate::metrics;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

/// Legal successors of [`SessionState::Deposit`].
#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// Deposit committed or cancelled cleanly.
    MainMenu(AccountSession),
    /// Cash state unknown.
    MaintenanceRequired,
}

impl From<Next> for SessionState {
    fn from(next: Next) -> Self {
        match next {
            Next::MainMenu(session) => SessionState::MainMenu(session),
            Next::MaintenanceRequired => SessionState::MaintenanceRequired,
        }
    }
}

/// Which of the two racing tasks settled first.
enum FirstSettled {
    Sensor(Result<Result<bool, DeviceError>, JoinError>),
    Display(Result<Result<ViewResponse, DeviceError>, JoinError>),
}

fn escalate(cause: &'static str) -> Next {
    metrics::record_maintenance(cause);
    Next::MaintenanceRequired
}

/// Take one deposit.
pub async fn process(p: &Peripherals, session: AccountSession) -> Next {
    let id = session.session_id();

    if let Err(err) = p.dispenser.allow_deposit().await {
        error!(session = %id, error = %err, "Dispenser refused to open for deposit");
        announce(p.display.as_ref(), ErrorPrompt::AtmHardwareError).await;
        return escalate("allow_deposit_fault");
    }

    let display = p.display.clone();
    let mut view_task = tokio::spawn(async move {
        display
            .show_view(View::InsertCashToDeposit, ViewPayload::DisplayOnly)
            .await
    });
    let dispenser = p.dispenser.clone();
    let mut sensor_task = tokio::spawn(async move { dispenser.await_cash_insertion().await });

    let first = tokio::select! {
        biased;
        sensor = &mut sensor_task => FirstSettled::Sensor(sensor),
        view = &mut view_task => FirstSettled::Display(view),
    };

    match first {
        FirstSettled::Display(view) => {
            // Dropping the handle detaches the sensor task; it still settles.
            drop(sensor_task);
            debug!(session = %id, ?view, "Display settled before the cash sensor");
            return cancel(p, session).await;
        }
        FirstSettled::Sensor(Err(err)) => {
            error!(session = %id, error = %err, "Cash sensor task failed");
            view_task.abort();
            return escalate("cash_sensor_fault");
        }
        FirstSettled::Sensor(Ok(Err(err))) => {
            error!(session = %id, error = %err, "Cash sensor fault");
            // Take the insert-cash view down before maintenance is announced.
            view_task.abort();
            return escalate("cash_sensor_fault");
        }
        FirstSettled::Sensor(Ok(Ok(inserted))) => {
            debug!(session = %id, inserted, "Cash sensor settled first");
            match view_task.await {
                Ok(Ok(ViewResponse::DepositCancelledFromDisplay)) => {
                    debug!(session = %id, "Deposit cancelled from display");
                    return cancel(p, session).await;
                }
                Ok(Ok(ViewResponse::DepositResolvedNormally)) => {}
                Ok(Ok(other)) => {
                    error!(session = %id, response = ?other, "Unexpected insert-cash response");
                    warn!(session = %id, "Continuing as not cancelled; customer confirms next");
                }
                Ok(Err(err)) => {
                    error!(session = %id, error = %err, "Insert-cash view failed");
                    warn!(session = %id, "Continuing as not cancelled; customer confirms next");
                }
                Err(err) => {
                    error!(session = %id, error = %err, "Insert-cash view task failed");
                    warn!(session = %id, "Continuing as not cancelled; customer confirms next");
                }
            }
        }
    }

    let amount = match p.dispenser.count_deposit().await {
        Ok(amount) => amount,
        Err(err) => {
            error!(session = %id, error = %err, "Counting deposited cash failed");
            return escalate("count_fault");
        }
    };

    let confirmation = p
        .display
        .show_view(
            View::DepositConfirmation,
            ViewPayload::DepositConfirmation {
                target_account: session.account_number().clone(),
                amount,
            },
        )
        .await;
    match confirmation {
        Ok(ViewResponse::DepositConfirmation { confirmed: true }) => {}
        Ok(ViewResponse::DepositConfirmation { confirmed: false }) => {
            debug!(session = %id, "Deposit declined, refunding");
            return cancel(p, session).await;
        }
        Ok(other) => {
            error!(session = %id, response = ?other, "Unexpected deposit confirmation response, refunding");
            return cancel(p, session).await;
        }
        Err(err) => {
            error!(session = %id, error = %err, "Deposit confirmation failed, refunding");
            return cancel(p, session).await;
        }
    }

    commit(p, session, amount).await
}

async fn commit(p: &Peripherals, session: AccountSession, amount: Money) -> Next {
    let id = session.session_id();
    let account = session.account_number();
    let token = session.token();

    let balances = async {
        let previous = p.bank.retrieve_account_balance(account, token).await?;
        let new = p.bank.process_deposit(account, amount, token).await?;
        Ok::<_, BankError>((previous, new))
    };
    let (previous_balance, new_balance) = match balances.await {
        Ok(balances) => balances,
        Err(err) => {
            let prompt = match &err {
                BankError::Network(_) => {
                    warn!(session = %id, error = %err, "Bank unreachable, deposit not committed");
                    ErrorPrompt::NetworkFailure
                }
                _ => {
                    warn!(session = %id, error = %err, "Deposit rejected, refunding");
                    ErrorPrompt::UnknownError
                }
            };
            announce(p.display.as_ref(), prompt).await;
            return cancel(p, session).await;
        }
    };
    info!(session = %id, %amount, "Deposit committed");
    metrics::record_deposit_committed();

    let accepted = p.dispenser.accept_deposit().await;

    let summary = ViewPayload::DepositSummary {
        account: account.clone(),
        previous_balance,
        new_balance,
        amount,
    };
    if let Err(err) = p.display.show_view(View::DepositSummary, summary).await {
        warn!(session = %id, error = %err, "Deposit summary view failed");
    }

    match accepted {
        Ok(()) => Next::MainMenu(session),
        Err(err) => {
            error!(session = %id, error = %err, %amount, "Cash not stored after committed deposit");
            escalate("accept_deposit_fault")
        }
    }
}

async fn cancel(p: &Peripherals, session: AccountSession) -> Next {
    let id = session.session_id();

    let inserted = match p.dispenser.cancel_deposit().await {
        Ok(inserted) => inserted,
        Err(err) => {
            error!(session = %id, error = %err, "Deposit cancel failed");
            return escalate("cancel_deposit_fault");
        }
    };

    if inserted {
        let (prompt, emptied) = tokio::join!(
            p.display.show_prompt(Prompt::RetrieveDispensedFunds),
            p.dispenser.await_dispenser_emptied()
        );
        match prompt {
            Ok(handle) => {
                if let Err(err) = handle.close().await {
                    warn!(session = %id, error = %err, "Failed to close retrieve-cash prompt");
                }
            }
            Err(err) => warn!(session = %id, error = %err, "Failed to show retrieve-cash prompt"),
        }
        if let Err(err) = emptied {
            error!(session = %id, error = %err, "Returned cash not taken");
            return escalate("refund_fault");
        }
    }

    if let Err(err) = p
        .display
        .show_view(View::ActionCancelled, ViewPayload::DisplayOnly)
        .await
    {
        warn!(session = %id, error = %err, "Cancelled view failed");
    }
    Next::MainMenu(session)
}
